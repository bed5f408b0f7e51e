//! Copy event types for progress callbacks and NDJSON output

/// Events emitted by the engine while copying. One JSON object per line in
/// `--json` mode.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CopyEvent {
    /// A directory pass began
    PassStarted { mode: String },
    /// File skipped: the completed-file cache says it is done
    FileCached { path: String },
    /// File skipped: probing found source and destination already equal
    FileComplete { path: String },
    /// Copying begins; `resume_offset` is 0 for a fresh file
    FileStarted {
        path: String,
        resume_offset: u64,
        total_size: u64,
    },
    /// Emitted once per whole percent of progress
    Progress {
        path: String,
        percent: u64,
        copied: u64,
        total: u64,
        rate_mbps: f64,
        eta_secs: Option<u64>,
    },
    /// File finished; `bytes_copied` counts only bytes written this run
    FileCopied { path: String, bytes_copied: u64 },
    /// Per-file failure; directory copies continue past these
    FileError { path: String, message: String },
    /// Ctrl+C observed; the run stops after this
    Aborted,
}

impl CopyEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
