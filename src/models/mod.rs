//! Data models for discovered tests and their results
//!
//! This module contains the structures discovery produces and the result
//! objects the runners accumulate.

mod test_model;
mod test_result;

pub use test_model::{LifecycleBinding, TestClass, TestMethod, TestUnit};
pub use test_result::{
    Counters, LangType, LogScope, LogState, RunResult, TestClassResult, TestLog,
    TestMethodResult,
};
