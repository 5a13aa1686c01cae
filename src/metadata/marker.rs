//! Class and method markers
//!
//! Markers are the declarative annotations attached to test classes and
//! methods. Their order on a method matters: a repeat marker binds to the
//! case marker that follows it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::value::Value;

/// Environment the run is hosted in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeTarget {
    #[default]
    Headless,
    Editor,
}

impl RuntimeTarget {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "headless" | "cli" => Some(RuntimeTarget::Headless),
            "editor" => Some(RuntimeTarget::Editor),
            _ => None,
        }
    }
}

impl fmt::Display for RuntimeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeTarget::Headless => write!(f, "headless"),
            RuntimeTarget::Editor => write!(f, "editor"),
        }
    }
}

/// When an ignore marker applies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreMode {
    #[default]
    Always,
    InHeadlessOnly,
    InEditorOnly,
    Never,
}

/// Runtime-evaluated skip decision
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnorePolicy {
    pub mode: IgnoreMode,
    pub reason: Option<String>,
    pub hide_from_results: bool,
}

impl IgnorePolicy {
    pub fn new(mode: IgnoreMode) -> Self {
        Self {
            mode,
            reason: None,
            hide_from_results: false,
        }
    }

    pub fn always() -> Self {
        Self::new(IgnoreMode::Always)
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hide_from_results = true;
        self
    }

    pub fn is_ignored(&self, target: RuntimeTarget) -> bool {
        match self.mode {
            IgnoreMode::Always => true,
            IgnoreMode::InHeadlessOnly => target == RuntimeTarget::Headless,
            IgnoreMode::InEditorOnly => target == RuntimeTarget::Editor,
            IgnoreMode::Never => false,
        }
    }
}

/// Repeat or flaky-retry policy for a single case
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatPolicy {
    pub repeat_count: u32,
    pub fail_fast: bool,
    pub is_flaky: bool,
    pub max_flaky_retries: u32,
    #[serde(with = "duration_ms")]
    pub backoff: Duration,
}

impl RepeatPolicy {
    /// Run the case `count` extra times
    pub fn repeat(count: u32) -> Self {
        Self {
            repeat_count: count,
            ..Self::default()
        }
    }

    /// Retry a failing case up to `retries` extra times
    pub fn flaky(retries: u32, backoff: Duration) -> Self {
        Self {
            is_flaky: true,
            max_flaky_retries: retries,
            backoff,
            ..Self::default()
        }
    }

    pub fn fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Outer iterations the case is scheduled for
    pub fn iterations(&self) -> u32 {
        if self.is_flaky {
            1
        } else {
            self.repeat_count.saturating_add(1)
        }
    }

    /// Attempts allowed within one iteration
    pub fn attempts(&self) -> u32 {
        if self.is_flaky {
            self.max_flaky_retries.saturating_add(1)
        } else {
            1
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Per-class lifecycle hook role
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleRole {
    BeforeAll,
    AfterAll,
    SetUp,
    TearDown,
}

impl LifecycleRole {
    pub fn all() -> [LifecycleRole; 4] {
        [
            LifecycleRole::BeforeAll,
            LifecycleRole::AfterAll,
            LifecycleRole::SetUp,
            LifecycleRole::TearDown,
        ]
    }
}

impl fmt::Display for LifecycleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleRole::BeforeAll => write!(f, "BeforeAll"),
            LifecycleRole::AfterAll => write!(f, "AfterAll"),
            LifecycleRole::SetUp => write!(f, "SetUp"),
            LifecycleRole::TearDown => write!(f, "TearDown"),
        }
    }
}

/// Marker attached to a type
#[derive(Clone, Debug, PartialEq)]
pub enum ClassMarker {
    TestClass,
    Parallelizable,
    Ignore(IgnorePolicy),
}

/// Marker attached to a method, kept in declaration order
#[derive(Clone, Debug, PartialEq)]
pub enum MethodMarker {
    Case(Vec<Value>),
    Repeat(RepeatPolicy),
    Ignore(IgnorePolicy),
    Lifecycle(LifecycleRole),
    Name(String),
    Category(String),
}
