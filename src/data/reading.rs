//! Typed sensor results.
//!
//! A [`Reading`] is what a sensor hands to its indicator. The
//! [`ValueType`] tag says how the value is meant to be read; the value
//! itself may still be the numeric broken sentinel regardless of the tag.

use std::fmt;

/// How an indicator should interpret a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// A process exit code: zero is on, positive is off.
    Status,
    /// A textual state looked up in a state-to-colour table.
    State,
    /// A fraction in `0.0..=1.0`.
    Fraction,
}

impl ValueType {
    pub fn label(&self) -> &'static str {
        match self {
            ValueType::Status => "status",
            ValueType::State => "state",
            ValueType::Fraction => "fraction",
        }
    }
}

/// The raw payload of a reading.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Text(String),
    Float(f64),
}

impl Value {
    /// The integer broken sentinel.
    pub const BROKEN: Value = Value::Int(-1);

    /// The floating-point broken sentinel.
    pub const BROKEN_FRACTION: Value = Value::Float(-1.0);

    /// Coerce to a float. Text that does not parse yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Coerce to an integer, truncating floats toward zero.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(f.trunc() as i64),
            Value::Text(s) => s.trim().parse().ok(),
        }
    }

    /// True for negative numbers, the universal "sensor broken" signal.
    pub fn is_broken(&self) -> bool {
        match self {
            Value::Int(i) => *i < 0,
            Value::Float(f) => *f < 0.0,
            Value::Text(_) => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Text(s) => f.write_str(s),
            // Keep a decimal point so -1.0 and -1 stay distinguishable
            Value::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{:.1}", v),
            Value::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// One result flowing from a sensor to its indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub value_type: ValueType,
    pub value: Value,
}

impl Reading {
    pub fn new(value_type: ValueType, value: impl Into<Value>) -> Self {
        Self {
            value_type,
            value: value.into(),
        }
    }
}
