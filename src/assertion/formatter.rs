//! Value formatters
//!
//! Numeric values use locale-invariant formatting: integers are grouped by
//! thousands, floats get two decimals. Strings are quoted.

use crate::metadata::Value;

/// Renders a value inside an assertion message
pub trait ValueFormatter: Send + Sync {
    fn format(&self, value: &Value) -> String;
}

/// Raw `Display` of the underlying value
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFormatter;

impl ValueFormatter for DefaultFormatter {
    fn format(&self, value: &Value) -> String {
        match value {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StringFormatter;

impl ValueFormatter for StringFormatter {
    fn format(&self, value: &Value) -> String {
        match value {
            Value::Null => "\"null\"".to_string(),
            other => format!("\"{}\"", DefaultFormatter.format(other)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NumericFormatter;

impl ValueFormatter for NumericFormatter {
    fn format(&self, value: &Value) -> String {
        match value {
            Value::Int(n) => group_thousands(n.unsigned_abs(), *n < 0),
            Value::UInt(n) => group_thousands(*n, false),
            Value::Float(n) => format!("{n:.2}"),
            other => DefaultFormatter.format(other),
        }
    }
}

fn group_thousands(n: u64, negative: bool) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Pick a formatter by value category
pub fn formatter_for(value: &Value) -> Box<dyn ValueFormatter> {
    match value {
        Value::Int(_) | Value::UInt(_) | Value::Float(_) => Box::new(NumericFormatter),
        Value::Str(_) => Box::new(StringFormatter),
        _ => Box::new(DefaultFormatter),
    }
}
