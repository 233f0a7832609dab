use std::fmt::{self, Display, Formatter};

mod cast;
pub use cast::parse_literal;

/// The kind of a [`Value`], used to name cast targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ValueType {
    Undef,
    Null,
    Int,
    Float,
    String,
    Bool,
}

/// Result of evaluating an expression.
///
/// `Undef` means that no value was produced at all (an unknown function, an
/// operand that was itself undefined), while `Null` is an explicit "nothing".
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Undef,
    Null,
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Undef => ValueType::Undef,
            Value::Null => ValueType::Null,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Str(_) => ValueType::String,
            Value::Bool(_) => ValueType::Bool,
        }
    }

    pub fn is_undef(&self) -> bool {
        matches!(self, Value::Undef)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `Undef` or `Null`, the two kinds without payload.
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Undef | Value::Null)
    }
}

pub(crate) fn format_float(f: f64, out: &mut Formatter<'_>) -> fmt::Result {
    if f.is_nan() {
        write!(out, "nan")
    } else if f.is_infinite() {
        write!(out, "{}", if f > 0.0 { "inf" } else { "-inf" })
    } else {
        // Debug keeps the fraction (`14.0`), which keeps the text a float literal
        write!(out, "{f:?}")
    }
}

/// Canonical text form, the same text [`Value::cast_string`] produces.
impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undef => write!(f, "undef"),
            Value::Null => write!(f, "null"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => format_float(*x, f),
            Value::Str(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}
