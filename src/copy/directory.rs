//! Directory tree copy
//!
//! Two passes over the source tree. The first pass only copies files missing
//! at the destination, so on a rerun after an interruption the not-yet-seen
//! data starts flowing immediately. The second pass revisits existing files
//! and finishes any partial ones. Cache hits are skipped in both passes.

use std::collections::HashSet;
use std::path::Path;

use ignore::WalkBuilder;

use crate::error::{CopierError, CopierResult};

use super::event::CopyEvent;
use super::options::CopyMode;
use super::result::CopyResult;
use super::Copier;

impl Copier {
    /// Copy the tree rooted at `source` into `dest`, preserving relative
    /// layout. Per-file errors are collected; the walk keeps going.
    pub fn copy_directory(
        &mut self,
        source: &Path,
        dest: &Path,
        callback: &mut dyn FnMut(CopyEvent),
    ) -> CopierResult<CopyResult> {
        if !source.is_dir() {
            return Err(CopierError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }

        let mut result = CopyResult::default();

        let passes: &[CopyMode] = if self.options().new_only {
            &[CopyMode::NewFilesOnly]
        } else {
            &[CopyMode::NewFilesOnly, CopyMode::AllFiles]
        };

        for mode in passes {
            // Files the first pass already wrote must not be re-counted by
            // the second one.
            let handled: HashSet<String> = result.copied.iter().cloned().collect();
            self.copy_directory_pass(source, dest, *mode, &handled, callback, &mut result)?;
            if result.aborted {
                break;
            }
        }

        Ok(result)
    }

    fn copy_directory_pass(
        &mut self,
        source: &Path,
        dest: &Path,
        mode: CopyMode,
        handled: &HashSet<String>,
        callback: &mut dyn FnMut(CopyEvent),
        result: &mut CopyResult,
    ) -> CopierResult<()> {
        callback(CopyEvent::PassStarted {
            mode: mode.as_str().to_string(),
        });

        // Standard filters off: a copier must see hidden files and must not
        // honor .gitignore in the data it is preserving.
        let walk = WalkBuilder::new(source)
            .standard_filters(false)
            .follow_links(false)
            .build();

        for entry in walk {
            if self.is_aborted() {
                callback(CopyEvent::Aborted);
                result.aborted = true;
                return Ok(());
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    result.errors.push(e.to_string());
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let rel = match path.strip_prefix(source) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            let dest_path = dest.join(rel);
            let label = rel.display().to_string();

            if handled.contains(&label) {
                continue;
            }

            if mode == CopyMode::NewFilesOnly && dest_path.is_file() {
                continue;
            }

            match self.copy_file(path, &dest_path, callback) {
                Ok(outcome) => {
                    result.record(&label, outcome);
                    if result.aborted {
                        return Ok(());
                    }
                }
                Err(e) => {
                    callback(CopyEvent::FileError {
                        path: label.clone(),
                        message: e.to_string(),
                    });
                    result.errors.push(format!("{}: {}", label, e));
                }
            }
        }

        Ok(())
    }
}
