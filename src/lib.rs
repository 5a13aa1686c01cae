//! trialrun - declarative unit-test framework
//!
//! Test classes are registered as declarations carrying markers (cases,
//! repeat and flaky policies, ignores, lifecycle roles). Discovery turns them
//! into runnable classes, the executor runs parallelizable classes
//! concurrently and the rest in order, and every outcome is folded into a
//! single `RunResult`.
//!
//! ```no_run
//! use trialrun::backend::{NativeBackend, TestManager};
//! use trialrun::config::RunConfig;
//! use trialrun::metadata::{MethodDecl, ParamKind, TestModule, TypeDecl};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let module = TestModule::new("math").register(
//!     TypeDecl::new("MathTests")
//!         .test_class()
//!         .method(
//!             MethodDecl::new("adds", |_| Ok(()))
//!                 .params([ParamKind::Int, ParamKind::Int])
//!                 .case([1, 2])
//!                 .case([3, 4]),
//!         ),
//! );
//!
//! let mut manager = TestManager::new(RunConfig::default()).with_native(NativeBackend::new(module));
//! let result = manager.run().await?;
//! assert!(result.is_success());
//! # Ok(())
//! # }
//! ```

pub mod assertion;
pub mod backend;
pub mod cli;
pub mod config;
pub mod demo;
pub mod discovery;
pub mod executor;
pub mod metadata;
pub mod models;
pub mod output;
pub mod probe;
pub mod utils;
