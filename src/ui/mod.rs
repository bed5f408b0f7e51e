//! Terminal output helpers: progress rendering and capability detection.

mod progress;
mod terminal;

pub use progress::{format_duration_mmss, format_size, ProgressBar};
pub use terminal::{detect_capabilities, TerminalCapabilities};
