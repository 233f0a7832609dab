use errors::{Error, Result};
use parser::{Expr, Op};
use value::Value;

mod expression;
pub use expression::Expression;

mod ops;

mod resolver;
pub use resolver::{call_builtin, DefaultResolver, Resolver};

mod variables;
pub use variables::{indexed_name, Variables};

/// Walks an expression tree and computes its value. Variables and function
/// calls are answered by the resolver.
///
/// The first error of any subexpression aborts the whole evaluation.
#[derive(Clone, Copy)]
pub struct Interpreter<'r> {
    resolver: &'r dyn Resolver,
}

impl std::fmt::Debug for Interpreter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter").finish_non_exhaustive()
    }
}

impl<'r> Interpreter<'r> {
    pub fn new(resolver: &'r dyn Resolver) -> Self {
        Self { resolver }
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Resolve { name, indices } => self.resolve(name, indices),
            Expr::Call { name, args } => self.call(name, args),
            Expr::Calc { op: Op::Ternary, left, right: Some(right), cond: Some(cond) } => {
                // Only the branch that is taken gets evaluated
                if ops::truthy(self.evaluate(cond)?)? {
                    self.evaluate(left)
                } else {
                    self.evaluate(right)
                }
            }
            Expr::Calc { op: Op::And, left, right: Some(right), .. } => {
                let value = ops::truthy(self.evaluate(left)?)?
                    && ops::truthy(self.evaluate(right)?)?;
                Ok(Value::Bool(value))
            }
            Expr::Calc { op: Op::Or, left, right: Some(right), .. } => {
                let value = ops::truthy(self.evaluate(left)?)?
                    || ops::truthy(self.evaluate(right)?)?;
                Ok(Value::Bool(value))
            }
            Expr::Calc { op: Op::Ex, left, right: None, .. } => {
                Ok(Value::Bool(self.exists(left)?))
            }
            Expr::Calc { op, left, right: None, .. } => ops::unary(*op, self.evaluate(left)?),
            Expr::Calc { op, left, right: Some(right), .. } => {
                let left = self.evaluate(left)?;
                ops::binary(*op, left, self.evaluate(right)?)
            }
        }
    }

    /// A variable exists if the resolver answers it with anything but `Undef`.
    /// Only the lookup itself may fail, errors in the indices propagate.
    fn exists(&self, expr: &Expr) -> Result<bool> {
        let Expr::Resolve { name, indices } = expr else {
            return Ok(!self.evaluate(expr)?.is_undef());
        };

        let indices = self.indices(indices)?;
        match self.resolver.resolve(name, &indices) {
            Ok(value) => Ok(!value.is_undef()),
            Err(e) => {
                log::trace!("{} does not exist: {}", expr, e);
                Ok(false)
            }
        }
    }

    fn indices(&self, indices: &[Expr]) -> Result<Vec<i64>> {
        indices.iter().map(|index| self.evaluate(index)?.fetch_int()).collect()
    }

    fn resolve(&self, name: &str, indices: &[Expr]) -> Result<Value> {
        let indices = self.indices(indices)?;

        log::trace!("Resolving {}{:?}", name, indices);
        self.resolver.resolve(name, &indices)
    }

    fn call(&self, name: &str, args: &[Expr]) -> Result<Value> {
        let mut values = Vec::new();
        values.try_reserve_exact(args.len()).map_err(|_| Error::OutOfMemory)?;
        for arg in args {
            values.push(self.evaluate(arg)?);
        }

        log::trace!("Calling {}({:?})", name, values);
        self.resolver.call(name, &values)
    }
}
