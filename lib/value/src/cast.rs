use errors::{Error, Result};
use scanner::{Flags, Literal, TokenKind, Tokenizer};

use crate::{Value, ValueType};

/// Reads `text` as a single number or boolean literal.
///
/// The text is run through the tokenizer, so anything the expression language
/// accepts as a literal is accepted here (`12`, `-0x1f`, `2.5e3`, `#fff`, `true`)
/// and nothing else. The literal has to consume the whole text.
pub fn parse_literal(text: &str) -> Option<Value> {
    let mut tokenizer = Tokenizer::from(text);
    let value = match tokenizer.get_token(Flags::GET) {
        TokenKind::IValue | TokenKind::FValue => match tokenizer.literal() {
            Literal::Int(i) => Value::Int(i),
            Literal::Float(f) => Value::Float(f),
            Literal::None => return None,
        },
        TokenKind::True => Value::Bool(true),
        TokenKind::False => Value::Bool(false),
        _ => return None,
    };

    (tokenizer.get_token(Flags::GET) == TokenKind::Eof).then_some(value)
}

fn literal_of(text: String, target: ValueType) -> Result<Value> {
    parse_literal(&text).ok_or_else(|| {
        log::debug!("`{text}` is not a {target} literal");
        Error::bad_type(Value::Str(text).cast_string_ext(), target.into())
    })
}

fn float_to_int(f: f64) -> Result<i64> {
    // Truncates toward zero. i64::MIN is exact as a float, i64::MAX rounds up to 2^63.
    let t = f.trunc();
    if t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Ok(t as i64)
    } else {
        Err(Error::bad_type(Value::Float(f), ValueType::Int.into()))
    }
}

impl Value {
    /// `Undef` and `Null` pass through every cast except the string casts.
    pub fn cast(self, target: ValueType) -> Result<Value> {
        match target {
            ValueType::Int => self.cast_int(),
            ValueType::Float => self.cast_float(),
            ValueType::Bool => self.cast_bool(),
            ValueType::String => Ok(self.cast_string()),
            ValueType::Undef | ValueType::Null => Ok(self),
        }
    }

    pub fn cast_int(self) -> Result<Value> {
        match self {
            Value::Int(_) | Value::Undef | Value::Null => Ok(self),
            Value::Float(f) => float_to_int(f).map(Value::Int),
            Value::Bool(b) => Ok(Value::Int(i64::from(b))),
            Value::Str(s) => literal_of(s, ValueType::Int)?.cast_int(),
        }
    }

    pub fn cast_float(self) -> Result<Value> {
        match self {
            Value::Float(_) | Value::Undef | Value::Null => Ok(self),
            Value::Int(i) => Ok(Value::Float(i as f64)),
            Value::Bool(b) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
            Value::Str(s) => literal_of(s, ValueType::Float)?.cast_float(),
        }
    }

    pub fn cast_bool(self) -> Result<Value> {
        match self {
            Value::Bool(_) | Value::Undef | Value::Null => Ok(self),
            Value::Int(i) => Ok(Value::Bool(i != 0)),
            Value::Float(f) => Ok(Value::Bool(f != 0.0)),
            Value::Str(s) => literal_of(s, ValueType::Bool)?.cast_bool(),
        }
    }

    pub fn cast_string(self) -> Value {
        match self {
            Value::Str(_) => self,
            other => Value::Str(other.to_string()),
        }
    }

    /// Like [`cast_string`](Self::cast_string), but strings come out quoted and
    /// escaped, so the text reads back as the same value.
    pub fn cast_string_ext(self) -> Value {
        match self {
            Value::Str(s) => {
                let mut quoted = String::with_capacity(s.len() + 2);
                quoted.push('\'');
                for c in s.chars() {
                    match c {
                        '\\' => quoted.push_str("\\\\"),
                        '\'' => quoted.push_str("\\'"),
                        '\n' => quoted.push_str("\\n"),
                        '\r' => quoted.push_str("\\r"),
                        '\t' => quoted.push_str("\\t"),
                        '\0' => quoted.push_str("\\0"),
                        c => quoted.push(c),
                    }
                }
                quoted.push('\'');
                Value::Str(quoted)
            }
            other => other.cast_string(),
        }
    }

    /// Turns strings and booleans into an `Int` or `Float`, whichever the text
    /// denotes. Numbers stay as they are.
    pub fn cast_numeric(self) -> Result<Value> {
        match self {
            Value::Int(_) | Value::Float(_) | Value::Undef | Value::Null => Ok(self),
            Value::Bool(b) => Ok(Value::Int(i64::from(b))),
            Value::Str(s) => match literal_of(s, ValueType::Float)? {
                Value::Bool(b) => Ok(Value::Int(i64::from(b))),
                number => Ok(number),
            },
        }
    }

    /// Turns a string into whatever literal it spells. Other kinds stay as they are.
    pub fn cast_non_string(self) -> Result<Value> {
        match self {
            Value::Str(s) => match parse_literal(&s) {
                Some(value) => Ok(value),
                None => Err(Error::bad_type(Value::Str(s).cast_string_ext(), "non-string")),
            },
            other => Ok(other),
        }
    }

    pub fn fetch_int(&self) -> Result<i64> {
        match self.clone().cast_int()? {
            Value::Int(i) => Ok(i),
            other => Err(Error::bad_type(other, ValueType::Int.into())),
        }
    }

    pub fn fetch_float(&self) -> Result<f64> {
        match self.clone().cast_float()? {
            Value::Float(f) => Ok(f),
            other => Err(Error::bad_type(other, ValueType::Float.into())),
        }
    }

    pub fn fetch_bool(&self) -> Result<bool> {
        match self.clone().cast_bool()? {
            Value::Bool(b) => Ok(b),
            other => Err(Error::bad_type(other, ValueType::Bool.into())),
        }
    }

    pub fn fetch_string(&self) -> Result<String> {
        match self {
            Value::Undef | Value::Null => Err(Error::bad_type(self, ValueType::String.into())),
            other => Ok(other.to_string()),
        }
    }
}
