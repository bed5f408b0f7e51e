//! Completed-file cache
//!
//! Remembers which destination files finished copying so later runs over the
//! same tree can skip them without probing their content. An entry maps the
//! destination path to the mtime it had when the copy completed; if the file
//! was touched since, the entry no longer matches and the file is re-checked.
//!
//! Entries whose recorded mtime is older than the maximum age are dropped at
//! save time to keep the cache file bounded.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{Duration, Utc};
use fs2::FileExt;

use crate::error::CopierResult;

/// Default entry lifetime in weeks
pub const DEFAULT_MAX_AGE_WEEKS: i64 = 4;

/// On-disk cache of completed destination files
#[derive(Debug, Clone)]
pub struct CopyCache {
    path: PathBuf,
    entries: HashMap<String, i64>,
    max_age_weeks: i64,
}

impl CopyCache {
    /// Load the cache from `path`; a missing or corrupt file yields an empty
    /// cache rather than an error.
    pub fn load(path: PathBuf) -> Self {
        let entries = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();

        Self {
            path,
            entries,
            max_age_weeks: DEFAULT_MAX_AGE_WEEKS,
        }
    }

    /// Default cache location: the platform cache dir, falling back to the
    /// working directory when none is available.
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .map(|dir| dir.join("copier/cache.json"))
            .unwrap_or_else(|| PathBuf::from(".copier-cache.json"))
    }

    pub fn with_max_age_weeks(mut self, weeks: i64) -> Self {
        self.max_age_weeks = weeks.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (destination path, recorded mtime millis) entries
    pub fn entries(&self) -> impl Iterator<Item = (&String, &i64)> {
        self.entries.iter()
    }

    /// True when `dest` exists and still carries the mtime recorded at the
    /// end of its copy.
    pub fn is_done(&self, dest: &Path) -> bool {
        if !dest.is_file() {
            return false;
        }
        match (self.entries.get(&cache_key(dest)), mtime_millis(dest)) {
            (Some(recorded), Some(current)) => *recorded == current,
            _ => false,
        }
    }

    /// Record `dest` as fully copied and persist the cache.
    pub fn mark_done(&mut self, dest: &Path) -> CopierResult<()> {
        if let Some(mtime) = mtime_millis(dest) {
            self.entries.insert(cache_key(dest), mtime);
            self.save()?;
        }
        Ok(())
    }

    /// Drop entries older than the maximum age. Returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let cutoff = (Utc::now() - Duration::weeks(self.max_age_weeks)).timestamp_millis();
        let before = self.entries.len();
        self.entries.retain(|_, mtime| *mtime > cutoff);
        before - self.entries.len()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Persist the cache atomically, pruning expired entries first. A lock
    /// file guards against concurrent copier runs interleaving their writes.
    pub fn save(&mut self) -> CopierResult<()> {
        self.prune();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let lock_path = self.path.with_extension("lock");
        let lock_file = fs::File::create(&lock_path)?;
        lock_file.lock_exclusive()?;

        let result = self.save_unlocked();

        let _ = fs2::FileExt::unlock(&lock_file);
        result
    }

    fn save_unlocked(&self) -> CopierResult<()> {
        let content = serde_json::to_string_pretty(&self.entries)?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let tmp = tempfile::NamedTempFile::new_in(dir)?;
        fs::write(tmp.path(), content)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Canonical string key for a destination path. Canonicalization keeps the
/// cache stable across runs started from different working directories.
fn cache_key(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

fn mtime_millis(path: &Path) -> Option<i64> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    let since_epoch = modified.duration_since(UNIX_EPOCH).ok()?;
    i64::try_from(since_epoch.as_millis()).ok()
}
