//! Wall-clock timing for runs

use std::time::{Duration, Instant};
use tracing::debug;

/// Measures a labelled span of work
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    label: String,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            label: label.into(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// Consume the timer, log the span and return it in seconds
    pub fn finish(self) -> f64 {
        let secs = self.elapsed_secs();
        debug!("{} took {:.3}s", self.label, secs);
        secs
    }
}
