use cursor::{Col, Line};

/// Everything that can go wrong while scanning, parsing or evaluating an expression.
///
/// A failure always aborts the whole operation. Callers must not use any partial
/// output once one of these is returned.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error("error (l. {line}, c. {col}): {message}")]
    Lex { line: Line, col: Col, message: String },
    #[error("error (l. {line}, c. {col}): {message}")]
    UnexpectedToken { line: Line, col: Col, message: String },
    #[error("Can't convert {value} to {target}")]
    BadType { value: String, target: &'static str },
    #[error("Integer division by zero")]
    DivideByZero,
    #[error("Unresolved identifier: {0}")]
    Unresolved(String),
    #[error("Out of memory")]
    OutOfMemory,
}

impl Error {
    pub fn bad_type(value: impl ToString, target: &'static str) -> Self {
        Error::BadType { value: value.to_string(), target }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
