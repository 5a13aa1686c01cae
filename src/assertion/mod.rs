//! Assertion failure rendering
//!
//! Builds the single-line messages reported for failed assertions, and the
//! `confirm_*` helpers test bodies use to produce them.

mod confirm;
mod formatter;
mod message;

pub use confirm::{
    confirm_equal, confirm_false, confirm_in_range, confirm_not_equal, confirm_true,
};
pub use formatter::{
    formatter_for, DefaultFormatter, NumericFormatter, StringFormatter, ValueFormatter,
};
pub use message::AssertionMessage;

use thiserror::Error;

/// A failed assertion inside a test case
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AssertionError {
    pub message: String,
}

impl AssertionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
