//! Copier - resumable cross-platform file copy tool
//!
//! Copier copies files and directory trees and, after an interruption
//! (Ctrl+C, network drop, process kill), continues from where the previous
//! run stopped instead of re-copying everything. Completed files are
//! remembered in a small on-disk cache so repeated runs over large trees
//! stay cheap.

pub mod cache;
pub mod config;
pub mod copy;
pub mod error;
pub mod resume;
pub mod stats;
pub mod ui;
pub mod watcher;

// Re-exports for convenience
pub use cache::CopyCache;
pub use config::{Config, Verbosity};
pub use copy::{CopyEvent, CopyMode, CopyOptions, CopyResult, Copier, FileState};
pub use error::{CopierError, CopierResult};
pub use resume::{find_resume_position, ResumeCheck};
pub use stats::{RateEstimator, RollingMedian};
pub use watcher::{mirror, MirrorEvent, MirrorOptions};
