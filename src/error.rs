//! Error types for Copier
//!
//! Uses `thiserror` for library errors; the binary boundary wraps these in
//! `anyhow::Result`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Copier operations
pub type CopierResult<T> = Result<T, CopierError>;

/// Main error type for Copier operations
#[derive(Error, Debug)]
pub enum CopierError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache file could not be serialized/deserialized
    #[error("cache error: {0}")]
    Cache(#[from] serde_json::Error),

    /// Invalid configuration file
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Source path does not exist
    #[error("source not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Source is a directory but destination exists as a file (or vice versa)
    ///
    /// The path field cannot be called `source`: thiserror reserves that
    /// name for the error chain.
    #[error("source and destination kinds differ: {from} vs {dest}")]
    KindMismatch { from: PathBuf, dest: PathBuf },

    /// Probe block size of zero cannot make progress
    #[error("block size must be greater than zero")]
    InvalidBlockSize,

    /// Post-copy checksum verification failed
    #[error("verification failed for {path}: source and destination differ")]
    VerifyFailed { path: PathBuf },
}
