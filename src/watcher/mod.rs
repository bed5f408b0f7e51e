//! Continuous mirroring
//!
//! Implements the `watch` command with:
//! - Debouncing (100ms)
//! - Resume-aware re-copy of changed files
//! - Graceful Ctrl+C shutdown
//! - NDJSON output for CI

mod event;
mod mirror;

pub use event::{MirrorEvent, MirrorOptions, DEBOUNCE_MS};
pub use mirror::mirror;
