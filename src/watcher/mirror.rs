//! Watch-and-mirror loop

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::cache::CopyCache;
use crate::copy::Copier;
use crate::error::CopierResult;

use super::event::{MirrorEvent, MirrorOptions, WatcherState};

/// Watch `source` and keep `dest` up to date until `abort` is set.
///
/// Starts with a full tree copy, then re-copies individual files as change
/// notifications arrive. Changes are debounced so an editor writing a file
/// in several bursts triggers one copy, not five. Deletions are not
/// propagated; this mirrors additively.
pub fn mirror(
    options: MirrorOptions,
    abort: Arc<AtomicBool>,
    event_callback: impl Fn(MirrorEvent),
) -> CopierResult<()> {
    event_callback(MirrorEvent::MirrorStarted {
        source: options.source.display().to_string(),
        dest: options.dest.display().to_string(),
    });

    let cache = CopyCache::load(options.cache_file.clone());
    let mut copier = Copier::new(options.copy.clone(), cache).with_abort_flag(abort.clone());

    // Initial full pass so the mirror starts from a consistent state.
    copy_batch(&mut copier, &options, &[], &event_callback)?;

    let (tx, rx) = channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
        },
        Config::default(),
    )
    .map_err(|e| std::io::Error::other(e.to_string()))?;

    watcher
        .watch(&options.source, RecursiveMode::Recursive)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let mut state = WatcherState::new();

    // Startup cooldown: drain any initial events from notify (it sometimes
    // sends events for existing files when the watcher is first registered)
    let cooldown_end = Instant::now() + Duration::from_millis(500);
    while Instant::now() < cooldown_end {
        let _ = rx.recv_timeout(Duration::from_millis(50));
    }

    while !abort.load(Ordering::SeqCst) {
        if let Ok(path) = rx.recv_timeout(Duration::from_millis(50)) {
            // Only regular files are mirrored; a path that no longer exists
            // was a delete or rename-away and is dropped here.
            if path.is_file() {
                state.add_change(path);
            }
        }

        if state.should_copy() {
            let changes = state.take_changes();
            for path in &changes {
                event_callback(MirrorEvent::FileChanged {
                    path: path.display().to_string(),
                });
            }
            copy_batch(&mut copier, &options, &changes, &event_callback)?;
        }
    }

    event_callback(MirrorEvent::Shutdown);
    Ok(())
}

/// Copy a batch of changed files, or the whole tree when `changes` is empty.
fn copy_batch(
    copier: &mut Copier,
    options: &MirrorOptions,
    changes: &[PathBuf],
    callback: &impl Fn(MirrorEvent),
) -> CopierResult<()> {
    callback(MirrorEvent::CopyStarted);

    let result = if changes.is_empty() {
        match copier.copy_path(&options.source, &options.dest, &mut |_| {}) {
            Ok(result) => result,
            Err(e) => {
                callback(MirrorEvent::Error {
                    message: e.to_string(),
                });
                return Err(e);
            }
        }
    } else {
        let mut result = crate::copy::CopyResult::default();
        for path in changes {
            let rel = match path.strip_prefix(&options.source) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => continue,
            };
            let dest_path = options.dest.join(&rel);
            let label = rel.display().to_string();
            match copier.copy_file(path, &dest_path, &mut |_| {}) {
                Ok(outcome) => result.record(&label, outcome),
                Err(e) => {
                    callback(MirrorEvent::Error {
                        message: format!("{}: {}", label, e),
                    });
                    result.errors.push(format!("{}: {}", label, e));
                }
            }
        }
        result
    };

    callback(MirrorEvent::CopyComplete {
        copied: result.copied.len(),
        cached: result.cached.len(),
        errors: result.errors.len(),
    });

    if copier.options().use_cache {
        copier.cache_mut().save()?;
    }
    Ok(())
}
