//! Test backends
//!
//! A backend is one independent discovery and execution path. The native
//! backend runs Rust test modules; a script backend can be plugged in next
//! to it and its results are merged additively by the `TestManager`.

mod manager;
mod native;

pub use manager::TestManager;
pub use native::NativeBackend;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::executor::RunContext;
use crate::models::{LangType, RunResult};

/// Outcome of one backend execution
#[derive(Debug)]
pub enum BackendRun {
    /// The class-name filter matched nothing in this backend
    NoClassMatch(String),
    Ran { classes: u32, result: RunResult },
}

impl BackendRun {
    pub fn matched(&self) -> bool {
        matches!(self, BackendRun::Ran { .. })
    }
}

/// Discovery and execution provider
#[async_trait]
pub trait TestBackend: Send + Sync {
    fn name(&self) -> &str;

    fn lang(&self) -> LangType;

    async fn execute(&self, ctx: Arc<RunContext>) -> Result<BackendRun>;
}
