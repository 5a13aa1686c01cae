//! Read-only state shared by the workers of one run

use std::sync::Arc;

use crate::config::RunConfig;
use crate::probe::{LeakProbe, NoopProbe};

use super::cancel::FatalHook;

/// Configuration, cancellation hook and leak probe for a run
#[derive(Clone)]
pub struct RunContext {
    pub config: RunConfig,
    pub fatal: FatalHook,
    pub probe: Arc<dyn LeakProbe>,
}

impl RunContext {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            fatal: FatalHook::new(),
            probe: Arc::new(NoopProbe),
        }
    }

    pub fn with_fatal(mut self, fatal: FatalHook) -> Self {
        self.fatal = fatal;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn LeakProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.fatal.is_fired()
    }

    /// Leak count, or zero when monitoring is off
    pub fn sample_leaks(&self) -> i64 {
        if self.config.monitor_leaks {
            self.probe.sample()
        } else {
            0
        }
    }
}
