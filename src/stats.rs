//! Transfer-rate statistics
//!
//! A single raw rate sample per progress tick is far too noisy to display
//! (network shares in particular alternate between bursts and stalls), so the
//! shown rate and the remaining-time estimate are derived from a rolling
//! median over the last few samples.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default number of samples the rolling window holds
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Rolling median over a fixed-size window of samples
#[derive(Debug, Clone)]
pub struct RollingMedian {
    window_size: usize,
    window: VecDeque<f64>,
}

impl RollingMedian {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            window: VecDeque::new(),
        }
    }

    /// Push a sample, evicting the oldest one once the window is full
    pub fn add(&mut self, value: f64) {
        self.window.push_back(value);
        if self.window.len() > self.window_size {
            self.window.pop_front();
        }
    }

    /// Median of the current window; 0 when no samples have been added
    pub fn median(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }

        let mut sorted: Vec<f64> = self.window.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

impl Default for RollingMedian {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

/// Smoothed transfer-rate and ETA estimator.
///
/// Call [`RateEstimator::record`] whenever a progress tick happens (once per
/// whole percent); it samples the rate since the previous tick and folds it
/// into the median window.
#[derive(Debug, Clone)]
pub struct RateEstimator {
    median: RollingMedian,
    last_tick: Instant,
    bytes_since_tick: u64,
}

impl RateEstimator {
    pub fn new() -> Self {
        Self {
            median: RollingMedian::default(),
            last_tick: Instant::now(),
            bytes_since_tick: 0,
        }
    }

    /// Account for bytes copied since the last call
    pub fn add_bytes(&mut self, bytes: u64) {
        self.bytes_since_tick += bytes;
    }

    /// Sample the rate since the previous tick and reset the tick window.
    /// Returns the smoothed rate in MB/s.
    pub fn record(&mut self) -> f64 {
        let elapsed = self.last_tick.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let rate = (self.bytes_since_tick as f64 / (1024.0 * 1024.0)) / elapsed;
            self.median.add(rate);
        }
        self.last_tick = Instant::now();
        self.bytes_since_tick = 0;
        self.median.median()
    }

    /// Smoothed rate in MB/s without consuming the current tick
    pub fn rate_mbps(&self) -> f64 {
        self.median.median()
    }

    /// Remaining time for `remaining` bytes at the smoothed rate
    pub fn eta(&self, remaining: u64) -> Option<Duration> {
        let rate = self.median.median();
        if rate <= 0.0 {
            return None;
        }
        let secs = remaining as f64 / (rate * 1024.0 * 1024.0);
        if !secs.is_finite() || secs.is_sign_negative() {
            return None;
        }
        Some(Duration::from_secs_f64(secs))
    }
}

impl Default for RateEstimator {
    fn default() -> Self {
        Self::new()
    }
}
