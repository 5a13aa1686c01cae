//! Resource-leak probe
//!
//! The class runner samples the probe before and after every test method. A
//! rise in the count is reported as a warning; it never fails a test.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Counts live resources in the host
pub trait LeakProbe: Send + Sync {
    fn sample(&self) -> i64;
}

/// Probe that always reports zero, so the delta is always zero
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopProbe;

impl LeakProbe for NoopProbe {
    fn sample(&self) -> i64 {
        0
    }
}

/// Probe backed by a shared counter the host increments and decrements
#[derive(Clone, Debug, Default)]
pub struct CounterProbe {
    count: Arc<AtomicI64>,
}

impl CounterProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}

impl LeakProbe for CounterProbe {
    fn sample(&self) -> i64 {
        self.count.load(Ordering::SeqCst)
    }
}

/// Count of new leaked resources between two samples
pub fn leak_delta(before: i64, after: i64) -> u32 {
    u32::try_from(after.saturating_sub(before)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_probe_is_constant() {
        let probe = NoopProbe;
        assert_eq!(leak_delta(probe.sample(), probe.sample()), 0);
    }

    #[test]
    fn test_counter_probe() {
        let probe = CounterProbe::new();
        let before = probe.sample();
        probe.acquire();
        probe.acquire();
        probe.release();
        assert_eq!(leak_delta(before, probe.sample()), 1);
        assert_eq!(leak_delta(5, 3), 0);
    }
}
