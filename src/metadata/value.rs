//! Literal argument values for test cases
//!
//! Case markers carry a fixed tuple of literals. Before a case is invoked the
//! tuple is checked against the parameter kinds the method declared.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A literal argument bound to a test case
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::UInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(n) => Some(*n),
            Value::Int(n) => u64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            Value::UInt(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::UInt(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Declared kind of a test method parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Bool,
    Int,
    UInt,
    Float,
    Str,
    Any,
}

impl ParamKind {
    /// Whether a literal can be passed to a parameter of this kind
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (ParamKind::Any, _) => true,
            (ParamKind::Str, Value::Null | Value::Str(_)) => true,
            (ParamKind::Bool, v) => v.as_bool().is_some(),
            (ParamKind::Int, v) => v.as_i64().is_some(),
            (ParamKind::UInt, v) => v.as_u64().is_some(),
            (ParamKind::Float, v) => v.as_f64().is_some(),
            _ => false,
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Bool => "bool",
            ParamKind::Int => "int",
            ParamKind::UInt => "uint",
            ParamKind::Float => "float",
            ParamKind::Str => "string",
            ParamKind::Any => "any",
        };
        write!(f, "{name}")
    }
}

/// Argument tuple does not fit the method signature
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    #[error("expected {expected} arguments, got {actual}")]
    Arity { expected: usize, actual: usize },

    #[error("argument {index} ({value}) is not a valid {kind}")]
    Kind {
        index: usize,
        kind: ParamKind,
        value: Value,
    },
}

/// Check an argument tuple against declared parameter kinds
pub fn bind_args(params: &[ParamKind], args: &[Value]) -> Result<(), BindError> {
    if params.len() != args.len() {
        return Err(BindError::Arity {
            expected: params.len(),
            actual: args.len(),
        });
    }

    for (index, (kind, value)) in params.iter().zip(args).enumerate() {
        if !kind.accepts(value) {
            return Err(BindError::Kind {
                index,
                kind: *kind,
                value: value.clone(),
            });
        }
    }

    Ok(())
}

/// Render an argument tuple for logs, without brackets
pub fn render_params(args: &[Value]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
