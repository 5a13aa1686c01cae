//! Class runner
//!
//! Drives the lifecycle of one class:
//! BeforeAll, then SetUp / method / TearDown for every method, then AfterAll.
//! Hook faults are logged at run scope and counted as warnings; they never
//! stop the class.

use tracing::{debug, info, warn};

use crate::discovery::filter_methods;
use crate::metadata::LifecycleRole;
use crate::models::{LogState, TestClass, TestClassResult, TestLog, TestMethod};
use crate::probe::leak_delta;

use super::case::invoke_guarded;
use super::context::RunContext;
use super::method::run_method;

/// Run one class to completion
pub fn run_class(class: &TestClass, ctx: &RunContext) -> TestClassResult {
    info!("> {}...", class.name);

    let methods = match filter_methods(
        class,
        ctx.config.method_filter(),
        ctx.config.category.as_deref(),
    ) {
        Ok(methods) => methods,
        Err(e) => {
            warn!("{}", e);
            return TestClassResult::error(&class.name, e.to_string());
        }
    };

    let mut result = TestClassResult::new();
    record_discovery_warnings(class, &mut result);
    warn_multiple_hooks(class, &mut result);

    let class_ignore = class
        .ignore
        .as_ref()
        .filter(|policy| policy.is_ignored(ctx.config.target));

    run_hook(class, LifecycleRole::BeforeAll, ctx, &mut result);

    for method in methods {
        if ctx.is_cancelled() {
            debug!("{} cancelled before {}", class.name, method.name);
            break;
        }

        if let Some(policy) = class_ignore {
            if !policy.hide_from_results {
                mark_ignored(method, policy.reason.as_deref(), &mut result);
            }
            continue;
        }

        run_hook(class, LifecycleRole::SetUp, ctx, &mut result);
        let before = ctx.sample_leaks();

        let method_result = run_method(method, ctx);

        run_hook(class, LifecycleRole::TearDown, ctx, &mut result);
        let leaked = leak_delta(before, ctx.sample_leaks());

        if leaked > 0 {
            result.counters.warnings += 1;
            result.logs.push(TestLog::class(
                &class.name,
                LogState::Warning,
                format!("Calling {} created {} new leaked resource/s.", method.name, leaked),
            ));
        }

        result += method_result;
    }

    run_hook(class, LifecycleRole::AfterAll, ctx, &mut result);

    debug!(
        "{} finished: {} passed, {} failed, {} ignored",
        class.name, result.counters.passed, result.counters.failed, result.counters.ignored
    );

    result
}

/// Discovery warnings of every method count once per class run, whether or
/// not the method is filtered out or ignored
fn record_discovery_warnings(class: &TestClass, result: &mut TestClassResult) {
    for method in &class.methods {
        for warning in &method.warnings {
            result.counters.warnings += 1;
            result.logs.push(TestLog::method(
                &method.name,
                LogState::Warning,
                "",
                Some(warning.clone()),
            ));
        }
    }
}

fn warn_multiple_hooks(class: &TestClass, result: &mut TestClassResult) {
    for role in LifecycleRole::all() {
        if class.hook(role).is_some_and(|hook| hook.has_multiple) {
            result.counters.warnings += 1;
            result.logs.push(TestLog::class(
                &class.name,
                LogState::Warning,
                format!(
                    "Multiple [{}] methods found in {}. Running only the first one.",
                    role, class.name
                ),
            ));
        }
    }
}

/// Count every scheduled case of `method` as ignored
fn mark_ignored(method: &TestMethod, reason: Option<&str>, result: &mut TestClassResult) {
    for unit in &method.units {
        for _ in 0..unit.iterations() {
            result.counters.ignored += 1;
            result.logs.push(TestLog::method(
                &method.name,
                LogState::Ignored,
                &unit.rendered,
                reason.map(str::to_string),
            ));
        }
    }
}

fn run_hook(
    class: &TestClass,
    role: LifecycleRole,
    ctx: &RunContext,
    result: &mut TestClassResult,
) {
    let Some(hook) = class.hook(role) else {
        return;
    };

    if ctx.config.verbose {
        result.logs.push(TestLog::class(
            &class.name,
            LogState::Info,
            format!("[{}] {}", role, class.name),
        ));
    }

    if let Err(fault) = invoke_guarded(|| hook.invoke()) {
        let message = fault.message();
        warn!("[{}] {} failed: {}", role, class.name, message);
        result.counters.warnings += 1;
        result.logs.push(TestLog::run(
            LogState::Error,
            format!("[{}] {}: - {}", role, class.name, message),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::discovery::discover_test_class;
    use crate::metadata::{IgnorePolicy, MethodDecl, RepeatPolicy, TypeDecl};
    use crate::models::LogScope;
    use crate::probe::CounterProbe;
    use std::sync::{Arc, Mutex};

    type Journal = Arc<Mutex<Vec<String>>>;

    fn record(journal: &Journal, entry: &str) -> MethodDecl {
        let journal = journal.clone();
        let entry = entry.to_string();
        MethodDecl::unit(entry.clone(), move || {
            journal.lock().unwrap().push(entry.clone());
            Ok(())
        })
    }

    fn lifecycle_class(journal: &Journal) -> TypeDecl {
        TypeDecl::new("Lifecycle")
            .test_class()
            .method(record(journal, "after_all").lifecycle(LifecycleRole::AfterAll))
            .method(record(journal, "first").test())
            .method(record(journal, "set_up").lifecycle(LifecycleRole::SetUp))
            .method(record(journal, "second").test().test())
            .method(record(journal, "tear_down").lifecycle(LifecycleRole::TearDown))
            .method(record(journal, "before_all").lifecycle(LifecycleRole::BeforeAll))
    }

    #[test]
    fn test_lifecycle_order() {
        let journal: Journal = Arc::default();
        let class = discover_test_class(&lifecycle_class(&journal));

        let result = run_class(&class, &RunContext::new(RunConfig::default()));

        assert_eq!(result.counters.passed, 3);
        assert_eq!(
            *journal.lock().unwrap(),
            vec![
                "before_all",
                "set_up",
                "first",
                "tear_down",
                "set_up",
                "second",
                "second",
                "tear_down",
                "after_all",
            ]
        );
    }

    #[test]
    fn test_tear_down_runs_after_failure_and_hook_faults_warn() {
        let journal: Journal = Arc::default();
        let decl = TypeDecl::new("Faulty")
            .test_class()
            .method(MethodDecl::unit("before", || anyhow::bail!("no database")).lifecycle(LifecycleRole::BeforeAll))
            .method(MethodDecl::unit("fails", || anyhow::bail!("nope")).test())
            .method(record(&journal, "tear_down").lifecycle(LifecycleRole::TearDown));
        let class = discover_test_class(&decl);

        let result = run_class(&class, &RunContext::new(RunConfig::default()));

        assert_eq!(result.counters.failed, 1);
        assert_eq!(result.counters.warnings, 1);
        assert_eq!(*journal.lock().unwrap(), vec!["tear_down"]);
        let fault = result
            .logs
            .iter()
            .find(|l| l.state == LogState::Error)
            .unwrap();
        assert_eq!(fault.scope, LogScope::Run);
        assert_eq!(fault.message.as_deref(), Some("[BeforeAll] Faulty: - no database"));
    }

    #[test]
    fn test_method_filter_without_match_runs_nothing() {
        let journal: Journal = Arc::default();
        let class = discover_test_class(&lifecycle_class(&journal));
        let ctx = RunContext::new(RunConfig::default().with_method("missing"));

        let result = run_class(&class, &ctx);

        assert!(journal.lock().unwrap().is_empty());
        assert_eq!(result.counters, Default::default());
        assert_eq!(result.logs.len(), 1);
        assert_eq!(result.logs[0].state, LogState::Error);
    }

    #[test]
    fn test_class_ignore_skips_set_up() {
        let journal: Journal = Arc::default();
        let decl = lifecycle_class(&journal).ignore(IgnorePolicy::always().with_reason("broken"));
        let class = discover_test_class(&decl);

        let result = run_class(&class, &RunContext::new(RunConfig::default()));

        assert_eq!(result.counters.ignored, 3);
        assert_eq!(result.counters.passed, 0);
        assert_eq!(*journal.lock().unwrap(), vec!["before_all", "after_all"]);
    }

    #[test]
    fn test_multiple_hooks_warn_and_run_first() {
        let journal: Journal = Arc::default();
        let decl = TypeDecl::new("Twice")
            .test_class()
            .method(record(&journal, "setup_a").lifecycle(LifecycleRole::SetUp))
            .method(record(&journal, "setup_b").lifecycle(LifecycleRole::SetUp))
            .method(record(&journal, "case").test());
        let class = discover_test_class(&decl);

        let result = run_class(&class, &RunContext::new(RunConfig::default()));

        assert_eq!(result.counters.warnings, 1);
        assert_eq!(*journal.lock().unwrap(), vec!["setup_a", "case"]);
    }

    #[test]
    fn test_multiple_hooks_warn_once_per_class_run() {
        let journal: Journal = Arc::default();
        let decl = TypeDecl::new("Twice")
            .test_class()
            .method(record(&journal, "tear_down_a").lifecycle(LifecycleRole::TearDown))
            .method(record(&journal, "tear_down_b").lifecycle(LifecycleRole::TearDown))
            .method(record(&journal, "first").test())
            .method(record(&journal, "second").test());
        let class = discover_test_class(&decl);

        let result = run_class(&class, &RunContext::new(RunConfig::default()));

        assert_eq!(result.counters.passed, 2);
        assert_eq!(result.counters.warnings, 1);
        assert_eq!(
            *journal.lock().unwrap(),
            vec!["first", "tear_down_a", "second", "tear_down_a"]
        );
    }

    /// Two repeat markers in succession leave one discovery warning
    fn double_repeat(journal: &Journal) -> MethodDecl {
        record(journal, "double_repeat")
            .repeat(RepeatPolicy::repeat(1))
            .repeat(RepeatPolicy::repeat(1))
            .test()
    }

    #[test]
    fn test_discovery_warnings_survive_class_ignore() {
        let journal: Journal = Arc::default();
        let plain = TypeDecl::new("Markers").test_class().method(double_repeat(&journal));
        let ignored = TypeDecl::new("Markers")
            .test_class()
            .ignore(IgnorePolicy::always())
            .method(double_repeat(&journal));

        let ctx = RunContext::new(RunConfig::default());
        let plain = run_class(&discover_test_class(&plain), &ctx);
        let ignored = run_class(&discover_test_class(&ignored), &ctx);

        assert_eq!(plain.counters.warnings, 1);
        assert_eq!(ignored.counters.warnings, 1);
        assert_eq!(ignored.counters.ignored, 1);
        assert!(ignored
            .logs
            .iter()
            .any(|l| l.state == LogState::Warning && l.name == "double_repeat"));
    }

    #[test]
    fn test_discovery_warnings_survive_method_filter() {
        let journal: Journal = Arc::default();
        let decl = TypeDecl::new("Markers")
            .test_class()
            .method(double_repeat(&journal))
            .method(record(&journal, "plain").test());
        let class = discover_test_class(&decl);
        let ctx = RunContext::new(RunConfig::default().with_method("plain"));

        let result = run_class(&class, &ctx);

        assert_eq!(*journal.lock().unwrap(), vec!["plain"]);
        assert_eq!(result.counters.passed, 1);
        assert_eq!(result.counters.warnings, 1);
    }

    #[test]
    fn test_category_filter_selects_methods() {
        let journal: Journal = Arc::default();
        let decl = TypeDecl::new("Tagged")
            .test_class()
            .method(record(&journal, "fast").test().category("smoke"))
            .method(record(&journal, "slow").test().category("nightly"));
        let class = discover_test_class(&decl);
        let ctx = RunContext::new(RunConfig::default().with_category("smoke"));

        let result = run_class(&class, &ctx);

        assert_eq!(result.counters.passed, 1);
        assert_eq!(*journal.lock().unwrap(), vec!["fast"]);
    }

    #[test]
    fn test_leak_is_reported_as_warning() {
        let probe = CounterProbe::new();
        let leaker = probe.clone();
        let decl = TypeDecl::new("Leaky").test_class().method(
            MethodDecl::unit("leaks", move || {
                leaker.acquire();
                Ok(())
            })
            .test(),
        );
        let class = discover_test_class(&decl);
        let ctx = RunContext::new(RunConfig::default().monitor_leaks())
            .with_probe(Arc::new(probe));

        let result = run_class(&class, &ctx);

        assert_eq!(result.counters.passed, 1);
        assert_eq!(result.counters.warnings, 1);
        assert!(result.logs.iter().any(|l| l.state == LogState::Warning));
    }
}
