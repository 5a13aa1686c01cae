//! Test manager
//!
//! Single owner of a run: holds the configuration, the run accumulator and
//! the fatal hook, and composes the native and script backends.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::executor::{exit_process, FatalHook, RunContext};
use crate::models::{LogState, RunResult, TestLog};
use crate::probe::{LeakProbe, NoopProbe};
use crate::utils::Timer;

use super::{BackendRun, TestBackend};

type FatalHandler = Arc<dyn Fn() + Send + Sync>;

/// Owns one run from reset to the final `RunResult`
pub struct TestManager {
    config: RunConfig,
    result: RunResult,
    fatal: FatalHook,
    probe: Arc<dyn LeakProbe>,
    native: Option<Box<dyn TestBackend>>,
    script: Option<Box<dyn TestBackend>>,
    on_fatal: FatalHandler,
}

impl TestManager {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            result: RunResult::new(),
            fatal: FatalHook::new(),
            probe: Arc::new(NoopProbe),
            native: None,
            script: None,
            on_fatal: Arc::new(exit_process),
        }
    }

    pub fn with_native(mut self, backend: impl TestBackend + 'static) -> Self {
        self.native = Some(Box::new(backend));
        self
    }

    pub fn with_script(mut self, backend: impl TestBackend + 'static) -> Self {
        self.script = Some(Box::new(backend));
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn LeakProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Handler bound to the fatal hook at the start of every run
    pub fn on_fatal<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_fatal = Arc::new(handler);
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn result(&self) -> &RunResult {
        &self.result
    }

    pub fn fatal(&self) -> &FatalHook {
        &self.fatal
    }

    /// Reset, run every enabled backend and return the aggregated result
    pub async fn run(&mut self) -> Result<&RunResult> {
        self.result.reset();
        self.fatal.reset();
        let handler = self.on_fatal.clone();
        self.fatal.bind(move || handler());

        let timer = Timer::start("test run");
        let ctx = Arc::new(
            RunContext::new(self.config.clone())
                .with_fatal(self.fatal.clone())
                .with_probe(self.probe.clone()),
        );
        let class_filter = self.config.class_filter().map(str::to_string);

        let native_matched = match &self.native {
            Some(backend) if !self.config.disable_native => {
                run_backend(backend.as_ref(), &ctx, &mut self.result).await?
            }
            _ => false,
        };

        let skip_script = self.config.disable_script
            || self.fatal.is_fired()
            || (class_filter.is_some() && native_matched);

        let script_matched = match &self.script {
            Some(backend) if !skip_script => {
                run_backend(backend.as_ref(), &ctx, &mut self.result).await?
            }
            Some(backend) => {
                debug!("Skipping {} backend", backend.name());
                false
            }
            None => false,
        };

        if let Some(name) = class_filter {
            if !native_matched && !script_matched {
                warn!("No test class found with the name '{}'", name);
                self.result.push_log(TestLog::run(
                    LogState::Error,
                    format!("No test class found with the name '{name}'."),
                ));
            }
        }

        self.result.total_time = timer.finish();
        info!("{}", self.result);

        Ok(&self.result)
    }
}

async fn run_backend(
    backend: &dyn TestBackend,
    ctx: &Arc<RunContext>,
    acc: &mut RunResult,
) -> Result<bool> {
    info!("Running {:?} backend '{}'", backend.lang(), backend.name());

    let run = backend
        .execute(ctx.clone())
        .await
        .with_context(|| format!("Backend '{}' failed", backend.name()))?;

    match run {
        BackendRun::NoClassMatch(name) => {
            debug!("Backend '{}' has no class named '{}'", backend.name(), name);
            Ok(false)
        }
        BackendRun::Ran {
            classes,
            mut result,
        } => {
            let lang = backend.lang();
            result.logs = result
                .logs
                .into_iter()
                .map(|log| log.with_lang(lang))
                .collect();
            result.total_classes = classes;
            *acc += result;
            Ok(true)
        }
    }
}
