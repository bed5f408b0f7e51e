use std::time::Duration;

/// Byte-oriented progress line for a single file transfer.
///
/// Rate and ETA come from the engine's rolling-median estimator rather than
/// raw elapsed time; a single slow chunk would otherwise make the display
/// jump around.
#[derive(Debug, Clone)]
pub struct ProgressBar {
    total: u64,
    current: u64,
    width: u16,
    message: String,
    rate_mbps: f64,
    eta: Option<Duration>,
}

impl ProgressBar {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            current: 0,
            width: 20,
            message: String::new(),
            rate_mbps: 0.0,
            eta: None,
        }
    }

    pub fn with_message(total: u64, message: impl Into<String>) -> Self {
        let mut bar = Self::new(total);
        bar.message = message.into();
        bar
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = width.max(1);
    }

    pub fn set(&mut self, value: u64) {
        self.current = value.min(self.total);
    }

    pub fn set_rate(&mut self, rate_mbps: f64) {
        self.rate_mbps = rate_mbps;
    }

    pub fn set_eta(&mut self, eta: Option<Duration>) {
        self.eta = eta;
    }

    pub fn render(&self, supports_unicode: bool) -> String {
        let (filled, empty) = self.bar_segments();
        let bar = if supports_unicode {
            format!("{}{}", "━".repeat(filled), "─".repeat(empty))
        } else {
            format!("{}{}", "=".repeat(filled), "-".repeat(empty))
        };

        let pct = if self.total == 0 {
            100
        } else {
            (self.current.saturating_mul(100)) / self.total
        };

        let mut out = String::new();
        if !self.message.is_empty() {
            out.push_str(&self.message);
            out.push(' ');
        }
        out.push_str(&bar);
        out.push_str(&format!(
            "  {}/{} ({}%)",
            format_size(self.current),
            format_size(self.total),
            pct
        ));
        if self.rate_mbps > 0.0 {
            out.push_str(&format!(" | {:.2} MB/s", self.rate_mbps));
        }
        if let Some(eta) = self.eta {
            out.push_str(&format!(" | ETA {}", format_duration_mmss(eta)));
        }
        out
    }

    fn bar_segments(&self) -> (usize, usize) {
        let width = self.width.max(1) as usize;
        if self.total == 0 {
            return (width, 0);
        }

        let ratio = (self.current.min(self.total)) as f64 / self.total as f64;
        let filled = (ratio * width as f64).round().clamp(0.0, width as f64) as usize;
        (filled, width.saturating_sub(filled))
    }
}

/// Human byte count: 512 B, 14.2 KB, 5.21 MB, 1.30 GB
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    const GB: f64 = 1024.0 * 1024.0 * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("{:.2} GB", b / GB)
    } else if b >= MB {
        format!("{:.2} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// mm:ss rendering for remaining-time estimates; hours fold into minutes
pub fn format_duration_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
