//! Native backend over registered test modules

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::executor::{RunContext, TestExecutor};
use crate::metadata::TestModule;
use crate::models::LangType;

use super::{BackendRun, TestBackend};

pub struct NativeBackend {
    executor: TestExecutor,
}

impl NativeBackend {
    pub fn new(module: TestModule) -> Self {
        Self {
            executor: TestExecutor::new(Arc::new(module)),
        }
    }
}

#[async_trait]
impl TestBackend for NativeBackend {
    fn name(&self) -> &str {
        &self.executor.module().name
    }

    fn lang(&self) -> LangType {
        LangType::Native
    }

    async fn execute(&self, ctx: Arc<RunContext>) -> Result<BackendRun> {
        self.executor.execute(ctx).await
    }
}
