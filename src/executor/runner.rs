//! Native test executor
//!
//! Discovers the classes of a `TestModule`, builds the plan, fans the
//! parallel set out and then runs the sequential set, merging everything
//! into one `RunResult`.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::task;
use tracing::{debug, info};

use crate::backend::BackendRun;
use crate::discovery::{discover_test_classes, filter_classes, DiscoveryError};
use crate::metadata::TestModule;
use crate::models::{RunResult, TestClass};
use crate::probe::leak_delta;

use super::class::run_class;
use super::context::RunContext;
use super::parallel::ParallelExecutor;
use super::plan::ExecutionPlan;

/// Executor over the classes registered in one module
pub struct TestExecutor {
    module: Arc<TestModule>,
}

impl TestExecutor {
    pub fn new(module: Arc<TestModule>) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &TestModule {
        &self.module
    }

    /// Discovered classes after the class-name filter
    pub fn select_classes(&self, ctx: &RunContext) -> Result<Vec<TestClass>, DiscoveryError> {
        filter_classes(
            discover_test_classes(&self.module),
            ctx.config.class_filter(),
        )
    }

    /// Run the module and aggregate its results
    pub async fn execute(&self, ctx: Arc<RunContext>) -> Result<BackendRun> {
        let classes = match self.select_classes(&ctx) {
            Ok(classes) => classes,
            Err(DiscoveryError::NoClassFound(name)) => return Ok(BackendRun::NoClassMatch(name)),
            Err(e) => return Err(e.into()),
        };

        let plan = ExecutionPlan::build(classes, ctx.config.parallelize);
        let class_count = plan.total() as u32;
        info!(
            "Executing {} classes ({} parallel, {} sequential)",
            class_count,
            plan.parallel.len(),
            plan.sequential.len()
        );

        let leaks_before = ctx.sample_leaks();
        let ExecutionPlan {
            parallel,
            sequential,
        } = plan;

        let parallel_results = ParallelExecutor::new(ctx.config.max_concurrent)
            .run_classes(parallel, ctx.clone())
            .await;

        let seq_ctx = ctx.clone();
        let mut result = task::spawn_blocking(move || {
            let mut acc = RunResult::new();
            for class in &sequential {
                if seq_ctx.is_cancelled() {
                    debug!("Run cancelled, skipping remaining sequential classes");
                    break;
                }
                acc += run_class(class, &seq_ctx);
            }
            acc
        })
        .await
        .context("Sequential test worker failed")?;

        for class_result in parallel_results {
            result += class_result;
        }

        result.total_classes = class_count;
        result.total_leaks = leak_delta(leaks_before, ctx.sample_leaks());

        Ok(BackendRun::Ran {
            classes: class_count,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::metadata::{IgnorePolicy, LifecycleRole, MethodDecl, ParamKind, TypeDecl};
    use crate::models::LogState;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn module(counter: Arc<AtomicU32>, after_all_ok: Arc<AtomicU32>) -> TestModule {
        let before = counter.clone();
        let after = counter;
        TestModule::new("sample")
            .register(
                TypeDecl::new("Lifecycle")
                    .test_class()
                    .method(
                        MethodDecl::unit("init", move || {
                            before.fetch_add(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .lifecycle(LifecycleRole::BeforeAll),
                    )
                    .method(
                        MethodDecl::new("two_cases", |_| Ok(()))
                            .params([ParamKind::Int])
                            .case([1])
                            .case([2]),
                    )
                    .method(
                        MethodDecl::unit("done", move || {
                            anyhow::ensure!(after.load(Ordering::SeqCst) == 1, "counter moved");
                            after_all_ok.fetch_add(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .lifecycle(LifecycleRole::AfterAll),
                    ),
            )
            .register(
                TypeDecl::new("Parallel")
                    .test_class()
                    .parallelizable()
                    .method(MethodDecl::unit("fails", || anyhow::bail!("nope")).test())
                    .method(
                        MethodDecl::unit("hidden", || Ok(()))
                            .test()
                            .ignore(IgnorePolicy::always().hidden()),
                    ),
            )
    }

    fn executor() -> (TestExecutor, Arc<AtomicU32>, Arc<AtomicU32>) {
        let counter = Arc::new(AtomicU32::new(0));
        let after_all = Arc::new(AtomicU32::new(0));
        let exec = TestExecutor::new(Arc::new(module(counter.clone(), after_all.clone())));
        (exec, counter, after_all)
    }

    fn completed(run: BackendRun) -> RunResult {
        match run {
            BackendRun::Ran { result, .. } => result,
            BackendRun::NoClassMatch(name) => panic!("unexpected no match for {name}"),
        }
    }

    #[tokio::test]
    async fn test_lifecycle_runs_once() {
        let (exec, counter, after_all) = executor();
        let ctx = Arc::new(RunContext::new(RunConfig::default().with_class("Lifecycle")));

        let result = completed(exec.execute(ctx).await.unwrap());

        assert_eq!(result.counters.passed, 2);
        assert_eq!(result.counters.failed, 0);
        assert_eq!(result.total_classes, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(after_all.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_class() {
        let (exec, _, _) = executor();
        let ctx = Arc::new(RunContext::new(RunConfig::default().with_class("Missing")));

        let run = exec.execute(ctx).await.unwrap();

        assert!(matches!(run, BackendRun::NoClassMatch(name) if name == "Missing"));
    }

    #[tokio::test]
    async fn test_parallel_and_sequential_results_merge() {
        let (exec, _, _) = executor();

        let parallel = completed(
            exec.execute(Arc::new(RunContext::new(RunConfig::default())))
                .await
                .unwrap(),
        );
        let (exec, _, _) = executor();
        let sequential = completed(
            exec.execute(Arc::new(RunContext::new(RunConfig::default().sequential())))
                .await
                .unwrap(),
        );

        assert_eq!(parallel.counters, sequential.counters);
        assert_eq!(parallel.counters.passed, 2);
        assert_eq!(parallel.counters.failed, 1);
        assert_eq!(parallel.counters.ignored, 0);
        assert_eq!(parallel.total_classes, 2);
        assert!(!parallel.logs.iter().any(|l| l.name == "hidden"));
        assert_eq!(
            parallel.logs.iter().filter(|l| l.state == LogState::Failed).count(),
            1
        );
    }
}
