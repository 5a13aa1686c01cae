//! Fatal-failure hook
//!
//! The only cancellation primitive of a run. Firing it raises a flag the
//! runners check between units and then calls the bound handler, which in a
//! real run terminates the process. In-flight parallel workers may finish
//! their current case before they observe the flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type Handler = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct HookInner {
    fired: AtomicBool,
    handler: Mutex<Option<Handler>>,
}

/// Rebindable fatal-failure hook shared by every worker of a run
#[derive(Clone, Default)]
pub struct FatalHook {
    inner: Arc<HookInner>,
}

impl FatalHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the handler. Any previous handler is unbound first.
    pub fn bind<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut slot = self
            .inner
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        slot.take();
        *slot = Some(Arc::new(handler));
    }

    pub fn unbind(&self) {
        self.inner
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_bound(&self) -> bool {
        self.inner
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Clear the fired flag for a new run
    pub fn reset(&self) {
        self.inner.fired.store(false, Ordering::SeqCst);
    }

    pub fn is_fired(&self) -> bool {
        self.inner.fired.load(Ordering::SeqCst)
    }

    /// Cancel the run and invoke the handler. Only the first call after a
    /// reset reaches the handler.
    pub fn fire(&self) {
        if self.inner.fired.swap(true, Ordering::SeqCst) {
            return;
        }

        // Clone out of the lock so a handler may rebind without deadlocking
        let handler = self
            .inner
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        if let Some(handler) = handler {
            handler();
        }
    }
}

impl std::fmt::Debug for FatalHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FatalHook")
            .field("fired", &self.is_fired())
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Handler that terminates the process immediately
pub fn exit_process() {
    tracing::error!("Exiting on first failure");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn test_fire_sets_flag_and_calls_handler() {
        let calls = Arc::new(AtomicU32::new(0));
        let hook = FatalHook::new();
        let counter = calls.clone();
        hook.bind(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!hook.is_fired());
        hook.fire();
        assert!(hook.is_fired());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        hook.reset();
        assert!(!hook.is_fired());
    }

    #[test]
    fn test_rebind_does_not_stack_handlers() {
        let calls = Arc::new(AtomicU32::new(0));
        let hook = FatalHook::new();

        for _ in 0..3 {
            let counter = calls.clone();
            hook.bind(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        hook.fire();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_runs_once_until_reset() {
        let calls = Arc::new(AtomicU32::new(0));
        let hook = FatalHook::new();
        let counter = calls.clone();
        hook.bind(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        hook.fire();
        hook.clone().fire();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        hook.reset();
        hook.fire();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unbound_fire_only_cancels() {
        let hook = FatalHook::new();
        hook.bind(|| {});
        hook.unbind();
        assert!(!hook.is_bound());

        let shared = hook.clone();
        shared.fire();
        assert!(hook.is_fired());
    }
}
