//! Per-run configuration
//!
//! Plain data consumed by the executor. Built from the application config,
//! environment overrides and CLI flags.

use serde::{Deserialize, Serialize};
use std::ops::BitOr;
use std::path::PathBuf;

use crate::metadata::RuntimeTarget;

/// Output mode bitmask
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputMode(u8);

impl OutputMode {
    pub const NONE: OutputMode = OutputMode(0);
    /// Human-readable log and summary
    pub const LOG: OutputMode = OutputMode(0b01);
    /// Structured JSON dump
    pub const JSON: OutputMode = OutputMode(0b10);

    pub fn contains(self, other: OutputMode) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn from_str(s: &str) -> Option<Self> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .try_fold(OutputMode::NONE, |acc, part| {
                match part.to_lowercase().as_str() {
                    "log" => Some(acc | OutputMode::LOG),
                    "json" => Some(acc | OutputMode::JSON),
                    "none" => Some(acc),
                    _ => None,
                }
            })
    }
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::LOG
    }
}

impl BitOr for OutputMode {
    type Output = OutputMode;

    fn bitor(self, rhs: Self) -> Self::Output {
        OutputMode(self.0 | rhs.0)
    }
}

/// Flags controlling a single test run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// Run parallelizable classes concurrently
    pub parallelize: bool,

    /// Maximum classes in flight at once, 0 for unbounded
    pub max_concurrent: usize,

    pub verbose: bool,

    /// Exact class-name filter
    pub class_name: Option<String>,

    /// Method-name filter applied within every selected class
    pub method_name: Option<String>,

    /// Only run methods tagged with this category
    pub category: Option<String>,

    /// Fire the fatal-failure hook on the first failed case
    pub exit_on_failure: bool,

    /// Sample the leak probe around each test method
    pub monitor_leaks: bool,

    /// Sleep between flaky retries
    pub honor_backoff: bool,

    pub output: OutputMode,

    /// Destination of the JSON dump
    pub output_path: PathBuf,

    pub target: RuntimeTarget,

    /// Skip the native backend entirely
    pub disable_native: bool,

    /// Skip the script backend entirely
    pub disable_script: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            parallelize: true,
            max_concurrent: 0,
            verbose: false,
            class_name: None,
            method_name: None,
            category: None,
            exit_on_failure: false,
            monitor_leaks: false,
            honor_backoff: true,
            output: OutputMode::default(),
            output_path: PathBuf::from("test_results.json"),
            target: RuntimeTarget::default(),
            disable_native: false,
            disable_script: false,
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequential(mut self) -> Self {
        self.parallelize = false;
        self
    }

    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max;
        self
    }

    pub fn with_class(mut self, name: impl Into<String>) -> Self {
        self.class_name = Some(name.into());
        self
    }

    pub fn with_method(mut self, name: impl Into<String>) -> Self {
        self.method_name = Some(name.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_target(mut self, target: RuntimeTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn exit_on_failure(mut self) -> Self {
        self.exit_on_failure = true;
        self
    }

    pub fn monitor_leaks(mut self) -> Self {
        self.monitor_leaks = true;
        self
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    pub fn without_backoff(mut self) -> Self {
        self.honor_backoff = false;
        self
    }

    pub fn without_native(mut self) -> Self {
        self.disable_native = true;
        self
    }

    pub fn without_script(mut self) -> Self {
        self.disable_script = true;
        self
    }

    /// Class-name filter, ignoring empty strings
    pub fn class_filter(&self) -> Option<&str> {
        self.class_name.as_deref().filter(|s| !s.is_empty())
    }

    pub fn method_filter(&self) -> Option<&str> {
        self.method_name.as_deref().filter(|s| !s.is_empty())
    }
}
