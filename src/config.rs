//! Configuration module for Copier
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (COPIER_*)
//! 3. User config (~/.config/copier/config.toml)
//! 4. Built-in defaults (lowest priority)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_MAX_AGE_WEEKS;
use crate::error::CopierResult;

/// Default probe block size for resume detection (bytes)
pub const DEFAULT_BLOCK_SIZE: u64 = 1024;

/// Default streaming chunk size (bytes)
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Copy behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyConfig {
    #[serde(default = "default_block_size")]
    pub block_size: u64,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default)]
    pub verify: bool,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
            chunk_size: default_chunk_size(),
            verify: false,
        }
    }
}

fn default_block_size() -> u64 {
    DEFAULT_BLOCK_SIZE
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

/// Completed-file cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_max_age_weeks")]
    pub max_age_weeks: i64,

    /// Override for the cache file location
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age_weeks: default_max_age_weeks(),
            file: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_age_weeks() -> i64 {
    DEFAULT_MAX_AGE_WEEKS
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub verbosity: Verbosity,
}

/// Verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub copy: CopyConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> CopierResult<Self> {
        let (config, _warnings) = Self::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> CopierResult<(Self, Vec<ConfigWarning>)> {
        let content = std::fs::read_to_string(path)?;

        let mut unknown_paths: Vec<String> = Vec::new();
        let deserializer = toml::de::Deserializer::new(&content);

        let config: Self = serde_ignored::deserialize(deserializer, |path| {
            unknown_paths.push(path.to_string());
        })
        .map_err(|e| crate::error::CopierError::InvalidConfig {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let warnings = unknown_paths
            .into_iter()
            .map(|path_str| {
                let key = path_str
                    .split('.')
                    .next_back()
                    .unwrap_or(path_str.as_str())
                    .to_string();
                ConfigWarning {
                    key: key.clone(),
                    file: path.to_path_buf(),
                    line: find_line_number(&content, &key),
                    suggestion: suggest_key(&key),
                }
            })
            .collect();

        Ok((config, warnings))
    }

    /// Load from the user config file or fall back to defaults, applying
    /// environment overrides either way.
    pub fn load_or_default() -> Self {
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("copier/config.toml");
            if user_config.exists() {
                if let Ok(config) = Self::load(&user_config) {
                    return config.with_env_overrides();
                }
            }
        }

        Self::default().with_env_overrides()
    }

    /// Apply environment variable overrides (COPIER_* prefix)
    pub fn with_env_overrides(self) -> Self {
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    // Lookup is injected so tests never touch process-global env vars.
    fn with_env_lookup(mut self, get: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = get("COPIER_BLOCK_SIZE") {
            if let Ok(size) = val.parse::<u64>() {
                if size > 0 {
                    self.copy.block_size = size;
                }
            }
        }

        if let Some(val) = get("COPIER_VERIFY") {
            self.copy.verify = val.to_lowercase() != "false" && val != "0";
        }

        if let Some(val) = get("COPIER_CACHE") {
            self.cache.enabled = val.to_lowercase() != "false" && val != "0";
        }

        if let Some(path) = get("COPIER_CACHE_FILE") {
            if !path.is_empty() {
                self.cache.file = Some(PathBuf::from(path));
            }
        }

        if let Some(verbosity) = get("COPIER_VERBOSITY") {
            self.output.verbosity = match verbosity.to_lowercase().as_str() {
                "quiet" => Verbosity::Quiet,
                "verbose" => Verbosity::Verbose,
                _ => Verbosity::Normal,
            };
        }

        self
    }

    /// Resolved cache file location
    pub fn cache_file(&self) -> PathBuf {
        self.cache
            .file
            .clone()
            .unwrap_or_else(crate::cache::CopyCache::default_path)
    }
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "copy",
        "block_size",
        "chunk_size",
        "verify",
        "cache",
        "enabled",
        "max_age_weeks",
        "file",
        "output",
        "verbosity",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] = std::cmp::min(
                std::cmp::min(prev[j + 1] + 1, curr[j] + 1),
                prev[j] + cost,
            );
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
