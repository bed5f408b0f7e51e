//! Copy engine options

use crate::config::{Config, DEFAULT_BLOCK_SIZE, DEFAULT_CHUNK_SIZE};

/// Which files a directory pass touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMode {
    /// Only files missing at the destination
    NewFilesOnly,
    /// Every file, probing existing destinations for completeness
    AllFiles,
}

impl CopyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyMode::NewFilesOnly => "new_files_only",
            CopyMode::AllFiles => "all_files",
        }
    }
}

/// Options for a copy run
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Probe block size for resume detection
    pub block_size: u64,
    /// Streaming chunk size
    pub chunk_size: usize,
    /// Report what would happen, write nothing
    pub dry_run: bool,
    /// Skip the second directory pass (existing files are left alone)
    pub new_only: bool,
    /// Compare SHA-256 of source and destination after each file
    pub verify: bool,
    /// Consult and update the completed-file cache
    pub use_cache: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            dry_run: false,
            new_only: false,
            verify: false,
            use_cache: true,
        }
    }
}

impl CopyOptions {
    /// Seed options from loaded configuration; CLI flags layer on top.
    pub fn from_config(config: &Config) -> Self {
        Self {
            block_size: config.copy.block_size,
            chunk_size: config.copy.chunk_size,
            dry_run: false,
            new_only: false,
            verify: config.copy.verify,
            use_cache: config.cache.enabled,
        }
    }
}
