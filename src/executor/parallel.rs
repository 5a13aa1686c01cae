//! Parallel class execution
//!
//! Each parallelizable class runs on its own blocking worker. Workers never
//! touch the run accumulator; their results come back in completion order
//! and are merged by the caller.

use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task;
use tracing::{debug, error, info};

use crate::models::{TestClass, TestClassResult};

use super::class::run_class;
use super::context::RunContext;

/// Fan-out executor over the parallel class set
pub struct ParallelExecutor {
    /// Zero means unbounded
    max_concurrent: usize,
}

impl ParallelExecutor {
    pub fn new(max_concurrent: usize) -> Self {
        Self { max_concurrent }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Run every class concurrently and return results in completion order
    pub async fn run_classes(
        &self,
        classes: Vec<TestClass>,
        ctx: Arc<RunContext>,
    ) -> Vec<TestClassResult> {
        if classes.is_empty() {
            return Vec::new();
        }

        info!(
            "Running {} classes in parallel (max {} concurrent)",
            classes.len(),
            if self.max_concurrent == 0 {
                "unbounded".to_string()
            } else {
                self.max_concurrent.to_string()
            }
        );

        let semaphore = (self.max_concurrent > 0).then(|| Arc::new(Semaphore::new(self.max_concurrent)));
        let mut workers = FuturesUnordered::new();

        for class in classes {
            let semaphore = semaphore.clone();
            let ctx = ctx.clone();

            workers.push(async move {
                let name = class.name.clone();
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };

                if ctx.is_cancelled() {
                    debug!("Skipping {}: run cancelled", name);
                    return None;
                }

                match task::spawn_blocking(move || run_class(&class, &ctx)).await {
                    Ok(result) => Some(result),
                    Err(e) => {
                        error!("Worker for {} did not complete: {}", name, e);
                        Some(TestClassResult::error(
                            &name,
                            format!("Test class worker failed: {e}"),
                        ))
                    }
                }
            });
        }

        let mut results = Vec::new();
        while let Some(result) = workers.next().await {
            if let Some(result) = result {
                results.push(result);
            }
        }

        results
    }
}
