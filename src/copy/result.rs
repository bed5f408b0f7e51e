//! Copy run results

/// Outcome of copying a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Bytes were written; counts only this run's bytes
    Copied { bytes: u64 },
    /// Probe found source and destination already equal
    AlreadyComplete,
    /// Completed-file cache skipped the file without probing
    Cached,
    /// Dry run stopped before writing
    DryRun,
    /// Ctrl+C interrupted the chunk loop
    Aborted,
}

/// Aggregate result of a copy run
#[derive(Debug, Clone, Default)]
pub struct CopyResult {
    /// Files written this run (destination-relative paths)
    pub copied: Vec<String>,
    /// Files skipped as already complete (cache hit or probe)
    pub cached: Vec<String>,
    /// Per-file failures, formatted as "path: message"
    pub errors: Vec<String>,
    /// The run was interrupted by Ctrl+C
    pub aborted: bool,
}

impl CopyResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && !self.aborted
    }

    /// Fold a single-file outcome into the aggregate under `label`
    pub fn record(&mut self, label: &str, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Copied { .. } | FileOutcome::DryRun => {
                self.copied.push(label.to_string());
            }
            FileOutcome::AlreadyComplete | FileOutcome::Cached => {
                self.cached.push(label.to_string());
            }
            FileOutcome::Aborted => {
                self.aborted = true;
            }
        }
    }
}
