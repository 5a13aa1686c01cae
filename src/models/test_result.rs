//! Test result models
//!
//! Defines log entries and the method, class and run result objects.
//! Merging is a plain sum on counters and a concatenation on logs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Level a log entry was produced at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogScope {
    Method,
    Class,
    Run,
}

/// Outcome or severity of a log entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogState {
    Passed,
    Failed,
    Ignored,
    Info,
    Warning,
    Error,
}

impl LogState {
    pub fn symbol(&self) -> &'static str {
        match self {
            LogState::Passed => "✓",
            LogState::Failed => "✗",
            LogState::Ignored => "○",
            LogState::Info => "·",
            LogState::Warning => "!",
            LogState::Error => "!",
        }
    }
}

impl fmt::Display for LogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogState::Passed => write!(f, "PASSED"),
            LogState::Failed => write!(f, "FAILED"),
            LogState::Ignored => write!(f, "IGNORED"),
            LogState::Info => write!(f, "INFO"),
            LogState::Warning => write!(f, "WARNING"),
            LogState::Error => write!(f, "ERROR"),
        }
    }
}

/// Backend a log entry came from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LangType {
    #[default]
    Native,
    Script,
}

/// Structured log entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestLog {
    pub scope: LogScope,
    pub name: String,
    pub state: LogState,
    pub params: String,
    pub message: Option<String>,
    pub lang: LangType,
}

impl TestLog {
    pub fn method(
        name: impl Into<String>,
        state: LogState,
        params: impl Into<String>,
        message: Option<String>,
    ) -> Self {
        Self {
            scope: LogScope::Method,
            name: name.into(),
            state,
            params: params.into(),
            message,
            lang: LangType::Native,
        }
    }

    pub fn class(name: impl Into<String>, state: LogState, message: impl Into<String>) -> Self {
        Self {
            scope: LogScope::Class,
            name: name.into(),
            state,
            params: String::new(),
            message: Some(message.into()),
            lang: LangType::Native,
        }
    }

    pub fn run(state: LogState, message: impl Into<String>) -> Self {
        Self {
            scope: LogScope::Run,
            name: String::new(),
            state,
            params: String::new(),
            message: Some(message.into()),
            lang: LangType::Native,
        }
    }

    pub fn with_lang(mut self, lang: LangType) -> Self {
        self.lang = lang;
        self
    }
}

impl fmt::Display for TestLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.state.symbol())?;
        if !self.name.is_empty() {
            write!(f, "{}", self.name)?;
            if !self.params.is_empty() {
                write!(f, "({})", self.params)?;
            }
            write!(f, " ")?;
        }
        write!(f, "{}", self.state)?;
        if let Some(msg) = &self.message {
            write!(f, " - {msg}")?;
        }
        Ok(())
    }
}

/// Pass/fail/ignore/warning counters shared by every result level
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub passed: u32,
    pub failed: u32,
    pub ignored: u32,
    pub warnings: u32,
}

impl Counters {
    /// Case attempts that reached a counted outcome
    pub fn attempted(&self) -> u32 {
        self.passed + self.failed + self.ignored
    }
}

impl AddAssign for Counters {
    fn add_assign(&mut self, rhs: Self) {
        self.passed += rhs.passed;
        self.failed += rhs.failed;
        self.ignored += rhs.ignored;
        self.warnings += rhs.warnings;
    }
}

impl Add for Counters {
    type Output = Counters;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

/// Result of running one test method
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TestMethodResult {
    #[serde(flatten)]
    pub counters: Counters,
    pub logs: Vec<TestLog>,
}

impl TestMethodResult {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of running one test class
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TestClassResult {
    #[serde(flatten)]
    pub counters: Counters,
    pub logs: Vec<TestLog>,
}

impl TestClassResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Class result carrying a single error and zero counters
    pub fn error(class_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            counters: Counters::default(),
            logs: vec![TestLog::class(class_name, LogState::Error, message)],
        }
    }
}

impl AddAssign<TestMethodResult> for TestClassResult {
    fn add_assign(&mut self, rhs: TestMethodResult) {
        self.counters += rhs.counters;
        self.logs.extend(rhs.logs);
    }
}

impl AddAssign for TestClassResult {
    fn add_assign(&mut self, rhs: Self) {
        self.counters += rhs.counters;
        self.logs.extend(rhs.logs);
    }
}

impl Add for TestClassResult {
    type Output = TestClassResult;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

/// Aggregated result of a whole run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(flatten)]
    pub counters: Counters,
    pub total_leaks: u32,
    /// Elapsed seconds
    pub total_time: f64,
    pub total_classes: u32,
    pub logs: Vec<TestLog>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_tests(&self) -> u32 {
        self.counters.attempted()
    }

    pub fn is_success(&self) -> bool {
        self.counters.failed == 0
    }

    pub fn push_log(&mut self, log: TestLog) {
        self.logs.push(log);
    }

    /// Zero counters and drop logs
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl AddAssign<TestClassResult> for RunResult {
    fn add_assign(&mut self, rhs: TestClassResult) {
        self.counters += rhs.counters;
        self.logs.extend(rhs.logs);
    }
}

impl AddAssign for RunResult {
    fn add_assign(&mut self, rhs: Self) {
        self.counters += rhs.counters;
        self.total_leaks += rhs.total_leaks;
        self.total_classes += rhs.total_classes;
        self.logs.extend(rhs.logs);
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ran {} tests in {} test classes. Tests took {:.3}s.\n{} passed, {} failed, {} ignored, {} warnings.",
            self.total_tests(),
            self.total_classes,
            self.total_time,
            self.counters.passed,
            self.counters.failed,
            self.counters.ignored,
            self.counters.warnings
        )
    }
}
