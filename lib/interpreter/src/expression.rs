use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use cursor::{CharSource, Cursor};
use errors::Result;
use itertools::Itertools;
use parser::{Expr, ParseFlags, Parser};
use scanner::Tokenizer;
use value::Value;

use crate::{Interpreter, Resolver};

/// A parsed expression (or `;`-separated list of expressions) ready to be
/// evaluated any number of times, against any resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    exprs: Vec<Expr>,
}

impl Expression {
    pub fn parse(text: &str, flags: ParseFlags) -> Result<Self> {
        Self::parse_source(Cursor::new(text), flags)
    }

    pub fn parse_source<S: CharSource>(source: S, flags: ParseFlags) -> Result<Self> {
        let mut tokenizer = Tokenizer::new(source);
        let exprs = Parser::new(&mut tokenizer).parse(flags)?;
        Ok(Self { exprs })
    }

    /// Number of expressions, more than one only for lists.
    pub fn results(&self) -> usize {
        self.exprs.len()
    }

    pub fn exprs(&self) -> &[Expr] {
        &self.exprs
    }

    pub fn evaluate(&self, resolver: &dyn Resolver) -> Result<Value> {
        self.evaluate_at(0, resolver)
    }

    /// Evaluates the expression at `index`. Past the end the result is `Undef`.
    pub fn evaluate_at(&self, index: usize, resolver: &dyn Resolver) -> Result<Value> {
        match self.exprs.get(index) {
            Some(expr) => Interpreter::new(resolver).evaluate(expr),
            None => Ok(Value::Undef),
        }
    }

    pub fn evaluate_all(&self, resolver: &dyn Resolver) -> Result<Vec<Value>> {
        let interpreter = Interpreter::new(resolver);
        self.exprs.iter().map(|expr| interpreter.evaluate(expr)).collect()
    }

    /// Every variable name the expressions read, first occurrence first.
    pub fn dependencies(&self) -> Vec<&str> {
        self.exprs.iter().flat_map(Expr::dependencies).unique().collect()
    }

    pub fn depends(&self, name: &str) -> bool {
        self.dependencies().contains(&name)
    }
}

impl FromStr for Expression {
    type Err = errors::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, ParseFlags::NONE)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.exprs.iter().join("; "))
    }
}
