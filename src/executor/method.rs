//! Method runner
//!
//! Runs every unit of a test method through its repeat iterations and, for
//! flaky units, the retry loop inside each iteration.

use std::thread;
use tracing::{debug, warn};

use crate::assertion::AssertionError;
use crate::models::{LogState, TestLog, TestMethod, TestMethodResult, TestUnit};

use super::context::RunContext;

/// Run all units of `method` and collect their outcomes
pub fn run_method(method: &TestMethod, ctx: &RunContext) -> TestMethodResult {
    let mut result = TestMethodResult::new();
    let ignore = method
        .ignore
        .as_ref()
        .filter(|policy| policy.is_ignored(ctx.config.target));

    for unit in &method.units {
        for iteration in 0..unit.iterations() {
            if ctx.is_cancelled() {
                return result;
            }

            if let Some(policy) = ignore {
                if policy.hide_from_results {
                    continue;
                }
                result.counters.ignored += 1;
                result.logs.push(TestLog::method(
                    &method.name,
                    LogState::Ignored,
                    &unit.rendered,
                    policy.reason.clone(),
                ));
                continue;
            }

            match run_attempts(unit, ctx) {
                Ok(()) => {
                    result.counters.passed += 1;
                    result.logs.push(TestLog::method(
                        &method.name,
                        LogState::Passed,
                        &unit.rendered,
                        None,
                    ));
                }
                Err(_) if ctx.is_cancelled() => {
                    debug!("{}({}) abandoned after cancellation", method.name, unit.rendered);
                    return result;
                }
                Err(failure) => {
                    result.counters.failed += 1;
                    result.logs.push(TestLog::method(
                        &method.name,
                        LogState::Failed,
                        &unit.rendered,
                        Some(failure.message),
                    ));

                    if unit.fail_fast() {
                        debug!(
                            "{}({}) failed on iteration {}, skipping the rest",
                            method.name, unit.rendered, iteration
                        );
                        break;
                    }

                    if ctx.config.exit_on_failure {
                        warn!("{}({}) failed, aborting run", method.name, unit.rendered);
                        ctx.fatal.fire();
                        return result;
                    }
                }
            }
        }
    }

    result
}

/// Attempt a unit until it passes or its retry budget is spent.
///
/// Failed attempts with retries left are discarded. A cancelled run stops
/// retrying and hands back the last failure, which the caller drops.
fn run_attempts(unit: &TestUnit, ctx: &RunContext) -> Result<(), AssertionError> {
    let attempts = unit.attempts();
    let mut attempt = 1;

    loop {
        match unit.run() {
            Ok(()) => return Ok(()),
            Err(failure) if attempt >= attempts || ctx.is_cancelled() => return Err(failure),
            Err(failure) => {
                debug!(
                    "{}({}) attempt {}/{} failed: {}",
                    unit.method_name, unit.rendered, attempt, attempts, failure
                );

                if let Some(policy) = unit.repeat.as_ref() {
                    if ctx.config.honor_backoff && !policy.backoff.is_zero() {
                        thread::sleep(policy.backoff);
                    }
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::confirm_true;
    use crate::config::RunConfig;
    use crate::metadata::{
        test_fn, IgnoreMode, IgnorePolicy, RepeatPolicy, RuntimeTarget, TestFn, Value,
    };
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn method_with(units: Vec<TestUnit>) -> TestMethod {
        TestMethod {
            name: "method".to_string(),
            method_name: "method".to_string(),
            units,
            ignore: None,
            categories: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn unit(repeat: Option<RepeatPolicy>, body: TestFn) -> TestUnit {
        TestUnit::new("method", vec![], vec![], repeat, body)
    }

    /// Body that fails until it has been called `passes_on` times
    fn failing_until(passes_on: u32, calls: Arc<AtomicU32>) -> TestFn {
        test_fn(move |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            confirm_true(n >= passes_on)?;
            Ok(())
        })
    }

    fn count(result: &TestMethodResult, state: LogState) -> usize {
        result.logs.iter().filter(|l| l.state == state).count()
    }

    #[test]
    fn test_flaky_passes_on_last_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RepeatPolicy::flaky(2, Duration::ZERO);
        let method = method_with(vec![unit(Some(policy), failing_until(3, calls.clone()))]);

        let result = run_method(&method, &RunContext::new(RunConfig::default()));

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.counters.passed, 1);
        assert_eq!(result.counters.failed, 0);
        assert_eq!(count(&result, LogState::Passed), 1);
        assert_eq!(count(&result, LogState::Failed), 0);
    }

    #[test]
    fn test_flaky_exhausted_logs_one_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RepeatPolicy::flaky(2, Duration::from_millis(1));
        let method = method_with(vec![unit(Some(policy), failing_until(10, calls.clone()))]);

        let result = run_method(&method, &RunContext::new(RunConfig::default()));

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.counters.failed, 1);
        assert_eq!(count(&result, LogState::Failed), 1);
        assert_eq!(result.counters.attempted(), 1);
    }

    #[test]
    fn test_flaky_ignores_repeat_count() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut policy = RepeatPolicy::flaky(1, Duration::ZERO);
        policy.repeat_count = 4;
        let method = method_with(vec![unit(Some(policy), failing_until(0, calls.clone()))]);

        let result = run_method(&method, &RunContext::new(RunConfig::default()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.counters.passed, 1);
    }

    #[test]
    fn test_repeat_runs_every_iteration() {
        let calls = Arc::new(AtomicU32::new(0));
        let method = method_with(vec![unit(
            Some(RepeatPolicy::repeat(2)),
            failing_until(0, calls.clone()),
        )]);

        let result = run_method(&method, &RunContext::new(RunConfig::default()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.counters.passed, 3);
    }

    #[test]
    fn test_fail_fast_stops_remaining_iterations() {
        let calls = Arc::new(AtomicU32::new(0));
        let other_calls = Arc::new(AtomicU32::new(0));
        let method = method_with(vec![
            unit(
                Some(RepeatPolicy::repeat(2).fail_fast()),
                failing_until(10, calls.clone()),
            ),
            unit(None, failing_until(0, other_calls.clone())),
        ]);

        let result = run_method(&method, &RunContext::new(RunConfig::default()));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(other_calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.counters.failed, 1);
        assert_eq!(result.counters.passed, 1);
    }

    #[test]
    fn test_exit_on_failure_fires_hook() {
        let fired = Arc::new(AtomicU32::new(0));
        let calls = Arc::new(AtomicU32::new(0));
        let ctx = RunContext::new(RunConfig::default().exit_on_failure());
        let counter = fired.clone();
        ctx.fatal.bind(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let method = method_with(vec![
            unit(Some(RepeatPolicy::repeat(3)), failing_until(10, calls.clone())),
            unit(None, failing_until(0, calls.clone())),
        ]);

        let result = run_method(&method, &ctx);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(ctx.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.counters.failed, 1);
    }

    #[test]
    fn test_ignored_method_counts_each_iteration() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut method = method_with(vec![
            unit(Some(RepeatPolicy::repeat(1)), failing_until(0, calls.clone())),
            unit(None, failing_until(0, calls.clone())),
        ]);
        method.ignore = Some(IgnorePolicy::always().with_reason("slow"));

        let result = run_method(&method, &RunContext::new(RunConfig::default()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.counters.ignored, 3);
        assert_eq!(result.logs[0].message.as_deref(), Some("slow"));
    }

    #[test]
    fn test_hidden_ignore_leaves_no_trace() {
        let mut method = method_with(vec![unit(None, test_fn(|_| Ok(())))]);
        method.ignore = Some(IgnorePolicy::always().hidden());

        let result = run_method(&method, &RunContext::new(RunConfig::default()));
        assert_eq!(result, TestMethodResult::default());
    }

    #[test]
    fn test_ignore_depends_on_target() {
        let mut method = method_with(vec![unit(None, test_fn(|_| Ok(())))]);
        method.ignore = Some(IgnorePolicy::new(IgnoreMode::InEditorOnly));

        let headless = RunContext::new(RunConfig::default());
        assert_eq!(run_method(&method, &headless).counters.passed, 1);

        let editor = RunContext::new(RunConfig::default().with_target(RuntimeTarget::Editor));
        assert_eq!(run_method(&method, &editor).counters.ignored, 1);
    }

    #[test]
    fn test_unbound_arguments_fail_the_case() {
        let method = method_with(vec![TestUnit::new(
            "method",
            vec![],
            vec![Value::Null],
            None,
            test_fn(|_| Ok(())),
        )]);

        let result = run_method(&method, &RunContext::new(RunConfig::default()));
        // Arity mismatch: zero params declared, one argument given
        assert_eq!(result.counters.failed, 1);
        assert_eq!(result.counters.warnings, 0);
        assert_eq!(
            result.logs[0].message.as_deref(),
            Some("- Failed: Invalid test case parameters: null.")
        );
    }

    #[test]
    fn test_flaky_backoff_sleeps_between_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RepeatPolicy::flaky(2, Duration::from_millis(100));
        let method = method_with(vec![unit(Some(policy), failing_until(10, calls.clone()))]);

        let started = Instant::now();
        let result = run_method(&method, &RunContext::new(RunConfig::default()));

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.counters.failed, 1);
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[test]
    fn test_without_backoff_retries_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RepeatPolicy::flaky(2, Duration::from_secs(1));
        let method = method_with(vec![unit(Some(policy), failing_until(10, calls.clone()))]);

        let started = Instant::now();
        let result = run_method(&method, &RunContext::new(RunConfig::default().without_backoff()));

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.counters.failed, 1);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_cancelled_flaky_unit_is_not_reported() {
        let fired = Arc::new(AtomicU32::new(0));
        let calls = Arc::new(AtomicU32::new(0));
        let ctx = RunContext::new(RunConfig::default().exit_on_failure());
        let counter = fired.clone();
        ctx.fatal.bind(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // Another worker aborts the run while this unit still has retries left
        let fatal = ctx.fatal.clone();
        let seen = calls.clone();
        let body = test_fn(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            fatal.fire();
            anyhow::bail!("flaky")
        });
        let method = method_with(vec![unit(Some(RepeatPolicy::flaky(3, Duration::ZERO)), body)]);

        let result = run_method(&method, &ctx);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(result, TestMethodResult::default());
    }
}
