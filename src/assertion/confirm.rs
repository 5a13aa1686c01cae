//! Assertion helpers for test bodies

use crate::metadata::Value;

use super::formatter::{formatter_for, DefaultFormatter, ValueFormatter};
use super::message::AssertionMessage;
use super::AssertionError;

fn fail(
    template: &str,
    assertion: &str,
    expected: Option<&Value>,
    actual: Option<&Value>,
) -> AssertionError {
    let formatter = expected
        .or(actual)
        .map(formatter_for)
        .unwrap_or_else(|| Box::new(DefaultFormatter) as Box<dyn ValueFormatter>);
    let message = AssertionMessage::new(template, assertion, formatter.as_ref(), expected, actual);
    AssertionError::new(message.generate())
}

pub fn confirm_equal<T>(actual: T, expected: T) -> Result<(), AssertionError>
where
    T: Into<Value> + PartialEq,
{
    if actual == expected {
        return Ok(());
    }
    let (actual, expected) = (actual.into(), expected.into());
    Err(fail(
        "Expected {1}, but got {2}.",
        "ConfirmEqual",
        Some(&expected),
        Some(&actual),
    ))
}

pub fn confirm_not_equal<T>(actual: T, expected: T) -> Result<(), AssertionError>
where
    T: Into<Value> + PartialEq,
{
    if actual != expected {
        return Ok(());
    }
    let expected = expected.into();
    Err(fail(
        "Expected not {1}.",
        "ConfirmNotEqual",
        Some(&expected),
        None,
    ))
}

pub fn confirm_true(actual: bool) -> Result<(), AssertionError> {
    if actual {
        return Ok(());
    }
    Err(fail(
        "Expected {1}, but got {2}.",
        "ConfirmTrue",
        Some(&Value::Bool(true)),
        Some(&Value::Bool(false)),
    ))
}

pub fn confirm_false(actual: bool) -> Result<(), AssertionError> {
    if !actual {
        return Ok(());
    }
    Err(fail(
        "Expected {1}, but got {2}.",
        "ConfirmFalse",
        Some(&Value::Bool(false)),
        Some(&Value::Bool(true)),
    ))
}

pub fn confirm_in_range<T>(actual: T, min: T, max: T) -> Result<(), AssertionError>
where
    T: Into<Value> + PartialOrd + Copy,
{
    if actual >= min && actual <= max {
        return Ok(());
    }
    let (min, max, actual) = (min.into(), max.into(), actual.into());
    let formatter = formatter_for(&actual);
    let template = format!(
        "Expected value in range [{}, {}], but got {{2}}.",
        formatter.format(&min),
        formatter.format(&max)
    );
    Err(fail(&template, "ConfirmInRange", None, Some(&actual)))
}
