//! Discovered test structure
//!
//! Classes own methods, methods own the units discovered from their case
//! markers. All of it is immutable once discovery is done.

use std::collections::HashMap;
use std::fmt;

use crate::metadata::{
    render_params, IgnorePolicy, LifecycleRole, ParamKind, RepeatPolicy, TestFn, Value,
};

/// One (method, argument tuple) pair
#[derive(Clone)]
pub struct TestUnit {
    pub method_name: String,
    pub params: Vec<ParamKind>,
    pub args: Vec<Value>,
    pub rendered: String,
    pub repeat: Option<RepeatPolicy>,
    pub(crate) body: TestFn,
}

impl TestUnit {
    pub fn new(
        method_name: impl Into<String>,
        params: Vec<ParamKind>,
        args: Vec<Value>,
        repeat: Option<RepeatPolicy>,
        body: TestFn,
    ) -> Self {
        let rendered = render_params(&args);
        Self {
            method_name: method_name.into(),
            params,
            args,
            rendered,
            repeat,
            body,
        }
    }

    /// Outer iterations scheduled for this unit
    pub fn iterations(&self) -> u32 {
        self.repeat.as_ref().map_or(1, RepeatPolicy::iterations)
    }

    /// Attempts allowed per iteration
    pub fn attempts(&self) -> u32 {
        self.repeat.as_ref().map_or(1, RepeatPolicy::attempts)
    }

    pub fn is_flaky(&self) -> bool {
        self.repeat.as_ref().is_some_and(|r| r.is_flaky)
    }

    pub fn fail_fast(&self) -> bool {
        self.repeat.as_ref().is_some_and(|r| r.fail_fast)
    }
}

impl fmt::Debug for TestUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestUnit")
            .field("method_name", &self.method_name)
            .field("rendered", &self.rendered)
            .field("repeat", &self.repeat)
            .finish_non_exhaustive()
    }
}

/// A test method and its units in declaration order
#[derive(Clone, Debug)]
pub struct TestMethod {
    /// Display name, either the override or the raw method name
    pub name: String,
    pub method_name: String,
    pub units: Vec<TestUnit>,
    pub ignore: Option<IgnorePolicy>,
    pub categories: Vec<String>,
    /// Marker pairing problems found during discovery
    pub warnings: Vec<String>,
}

impl TestMethod {
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Case attempts this method schedules when nothing is ignored
    pub fn scheduled_cases(&self) -> u32 {
        self.units.iter().map(TestUnit::iterations).sum()
    }
}

/// Lifecycle hook bound to a class role
#[derive(Clone)]
pub struct LifecycleBinding {
    pub method_name: String,
    pub has_multiple: bool,
    pub(crate) body: TestFn,
}

impl LifecycleBinding {
    pub fn new(method_name: impl Into<String>, body: TestFn, has_multiple: bool) -> Self {
        Self {
            method_name: method_name.into(),
            has_multiple,
            body,
        }
    }

    pub fn invoke(&self) -> anyhow::Result<()> {
        (self.body)(&[])
    }
}

impl fmt::Debug for LifecycleBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleBinding")
            .field("method_name", &self.method_name)
            .field("has_multiple", &self.has_multiple)
            .finish_non_exhaustive()
    }
}

/// A discovered test class
#[derive(Clone, Debug)]
pub struct TestClass {
    pub name: String,
    pub parallelizable: bool,
    pub ignore: Option<IgnorePolicy>,
    pub methods: Vec<TestMethod>,
    pub lifecycle: HashMap<LifecycleRole, LifecycleBinding>,
}

impl TestClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parallelizable: false,
            ignore: None,
            methods: Vec::new(),
            lifecycle: HashMap::new(),
        }
    }

    pub fn hook(&self, role: LifecycleRole) -> Option<&LifecycleBinding> {
        self.lifecycle.get(&role)
    }

    pub fn scheduled_cases(&self) -> u32 {
        self.methods.iter().map(TestMethod::scheduled_cases).sum()
    }
}
