//! Single-file copy with resume

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::atomic::Ordering;

use sha2::{Digest, Sha256};

use crate::error::{CopierError, CopierResult};
use crate::resume::{find_resume_position, ResumeCheck};
use crate::stats::RateEstimator;

use super::event::CopyEvent;
use super::result::FileOutcome;
use super::Copier;

/// Resume state of a single destination file, as reported by `diff`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// Destination does not exist
    New,
    /// Destination diverges at `offset` of `total` bytes
    Incomplete { offset: u64, total: u64 },
    /// Destination matches the source
    Complete,
    /// Completed-file cache vouches for the destination
    Cached,
}

impl FileState {
    /// Percentage already present at the destination
    pub fn percent_done(&self) -> u64 {
        match self {
            FileState::New => 0,
            FileState::Complete | FileState::Cached => 100,
            FileState::Incomplete { offset, total } => {
                if *total == 0 {
                    0
                } else {
                    offset * 100 / total
                }
            }
        }
    }
}

impl Copier {
    /// Classify `dest` against `source` without writing anything.
    pub fn inspect_file(&self, source: &Path, dest: &Path) -> CopierResult<FileState> {
        if !source.is_file() {
            return Err(CopierError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }

        if self.options().use_cache && self.cache().is_done(dest) {
            return Ok(FileState::Cached);
        }

        if !dest.is_file() {
            return Ok(FileState::New);
        }

        let total = std::fs::metadata(source)?.len();
        match find_resume_position(source, dest, self.options().block_size)? {
            ResumeCheck::Complete => Ok(FileState::Complete),
            ResumeCheck::Mismatch(offset) => Ok(FileState::Incomplete { offset, total }),
        }
    }

    /// Copy one file, resuming from the divergence point when the
    /// destination already holds a partial copy.
    pub fn copy_file(
        &mut self,
        source: &Path,
        dest: &Path,
        callback: &mut dyn FnMut(CopyEvent),
    ) -> CopierResult<FileOutcome> {
        if !source.is_file() {
            return Err(CopierError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }

        let label = source.display().to_string();

        if self.options.use_cache && self.cache.is_done(dest) {
            callback(CopyEvent::FileCached {
                path: label.clone(),
            });
            return Ok(FileOutcome::Cached);
        }

        let total_size = std::fs::metadata(source)?.len();

        let resume = if dest.is_file() {
            find_resume_position(source, dest, self.options.block_size)?
        } else {
            ResumeCheck::Mismatch(0)
        };

        let resume_offset = match resume {
            ResumeCheck::Complete => {
                if self.options.use_cache && !self.options.dry_run {
                    self.cache.mark_done(dest)?;
                }
                callback(CopyEvent::FileComplete {
                    path: label.clone(),
                });
                return Ok(FileOutcome::AlreadyComplete);
            }
            ResumeCheck::Mismatch(offset) => offset,
        };

        callback(CopyEvent::FileStarted {
            path: label.clone(),
            resume_offset,
            total_size,
        });

        if self.options.dry_run {
            return Ok(FileOutcome::DryRun);
        }

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut src = File::open(source)?;
        let mut dst = if resume_offset > 0 {
            OpenOptions::new().write(true).open(dest)?
        } else {
            File::create(dest)?
        };

        if resume_offset > 0 {
            src.seek(SeekFrom::Start(resume_offset))?;
            dst.seek(SeekFrom::Start(resume_offset))?;
        }

        let mut buf = vec![0u8; self.options.chunk_size.max(1)];
        let mut copied = resume_offset;
        let mut last_percent: Option<u64> = None;
        let mut rate = RateEstimator::new();

        loop {
            if self.abort.load(Ordering::SeqCst) {
                callback(CopyEvent::Aborted);
                return Ok(FileOutcome::Aborted);
            }

            let n = src.read(&mut buf)?;
            if n == 0 {
                break;
            }
            dst.write_all(&buf[..n])?;

            copied += n as u64;
            rate.add_bytes(n as u64);

            if total_size > 0 {
                let percent = copied * 100 / total_size;
                if last_percent != Some(percent) {
                    let rate_mbps = rate.record();
                    let eta_secs = rate
                        .eta(total_size.saturating_sub(copied))
                        .map(|d| d.as_secs());
                    callback(CopyEvent::Progress {
                        path: label.clone(),
                        percent,
                        copied,
                        total: total_size,
                        rate_mbps,
                        eta_secs,
                    });
                    last_percent = Some(percent);
                }
            }
        }

        // A resumed destination may be longer than the source (partial copy
        // plus junk); cut it back to the source length.
        dst.set_len(total_size)?;
        dst.flush()?;
        drop(dst);

        if self.options.verify {
            verify_checksums(source, dest)?;
        }

        if self.options.use_cache {
            self.cache.mark_done(dest)?;
        }

        let bytes_copied = copied - resume_offset;
        callback(CopyEvent::FileCopied {
            path: label,
            bytes_copied,
        });

        Ok(FileOutcome::Copied {
            bytes: bytes_copied,
        })
    }
}

fn verify_checksums(source: &Path, dest: &Path) -> CopierResult<()> {
    if hash_file(source)? != hash_file(dest)? {
        return Err(CopierError::VerifyFailed {
            path: dest.to_path_buf(),
        });
    }
    Ok(())
}

fn hash_file(path: &Path) -> CopierResult<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(format!("sha256:{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_state_percentages() {
        assert_eq!(FileState::New.percent_done(), 0);
        assert_eq!(FileState::Complete.percent_done(), 100);
        assert_eq!(
            FileState::Incomplete {
                offset: 250,
                total: 1000
            }
            .percent_done(),
            25
        );
        assert_eq!(
            FileState::Incomplete {
                offset: 0,
                total: 0
            }
            .percent_done(),
            0
        );
    }

    #[test]
    fn hash_file_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.bin");
        std::fs::write(&path, b"abc").unwrap();

        let a = hash_file(&path).unwrap();
        let b = hash_file(&path).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("sha256:"));
    }
}
