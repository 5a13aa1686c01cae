//! Execution of a single test unit
//!
//! Every way a case can go wrong is folded into an `AssertionError`, so the
//! method runner only ever sees one failure kind.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::assertion::AssertionError;
use crate::metadata::bind_args;
use crate::models::TestUnit;

impl TestUnit {
    /// Invoke the target method with the bound arguments.
    ///
    /// - an error returned by the body fails with its innermost message
    /// - arguments that do not fit the signature fail as invalid parameters
    /// - a panic fails with a generic `- Failed:` prefix
    pub fn run(&self) -> Result<(), AssertionError> {
        if bind_args(&self.params, &self.args).is_err() {
            return Err(AssertionError::new(format!(
                "- Failed: Invalid test case parameters: {}.",
                self.rendered
            )));
        }

        match invoke_guarded(|| (self.body)(&self.args)) {
            Ok(()) => Ok(()),
            Err(Fault::Returned(e)) => Err(AssertionError::new(e.root_cause().to_string())),
            Err(Fault::Panicked(msg)) => Err(AssertionError::new(format!("- Failed: {msg}"))),
        }
    }
}

/// Why a guarded call did not complete
#[derive(Debug)]
pub(crate) enum Fault {
    Returned(anyhow::Error),
    Panicked(String),
}

impl Fault {
    pub(crate) fn message(&self) -> String {
        match self {
            Fault::Returned(e) => e.root_cause().to_string(),
            Fault::Panicked(msg) => msg.clone(),
        }
    }
}

/// Call `f`, converting both returned errors and panics into a `Fault`
pub(crate) fn invoke_guarded<F>(f: F) -> Result<(), Fault>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(Fault::Returned(e)),
        Err(payload) => Err(Fault::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
