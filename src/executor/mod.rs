//! Test execution engine
//!
//! Builds the execution plan, runs parallelizable classes concurrently and
//! the rest sequentially, and aggregates everything into one `RunResult`.

mod cancel;
mod case;
mod class;
mod context;
mod method;
mod parallel;
mod plan;
mod runner;

pub use cancel::{exit_process, FatalHook};
pub use class::run_class;
pub use context::RunContext;
pub use method::run_method;
pub use parallel::ParallelExecutor;
pub use plan::{classify_tests, ExecutionPlan};
pub use runner::TestExecutor;
