use errors::Result;
use value::Value;

/// How an expression reaches the outside world: variables and function calls
/// are answered by the host through this trait.
///
/// Both methods have soft defaults. Unknown variables are `Null`, unknown
/// functions are `Undef`, and the built-in functions (`avg`, `max`, `min`,
/// `rms`) are always available. Hosts that want unknown names to be errors
/// override the methods and return [`errors::Error::Unresolved`].
pub trait Resolver {
    /// Looks up `name`, indexed by `indices` for `name[i][j]`.
    fn resolve(&self, name: &str, indices: &[i64]) -> Result<Value> {
        log::trace!("No value for {name}{indices:?}, using null");
        Ok(Value::Null)
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        call_builtin(name, args)
    }
}

/// Resolver that only knows the built-in functions.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultResolver;

impl Resolver for DefaultResolver {}

type Builtin = fn(&[Value]) -> Result<Value>;

// Sorted by name, searched with binary_search_by
const BUILTINS: &[(&str, Builtin)] = &[("avg", avg), ("max", max), ("min", min), ("rms", rms)];

/// Calls one of the built-in functions. Unknown names produce `Undef`.
pub fn call_builtin(name: &str, args: &[Value]) -> Result<Value> {
    match BUILTINS.binary_search_by(|(builtin, _)| (*builtin).cmp(name)) {
        Ok(i) => (BUILTINS[i].1)(args),
        Err(_) => {
            log::debug!("Unknown function {name}, result is undefined");
            Ok(Value::Undef)
        }
    }
}

/// Checks the arguments shared by all built-ins. `Some` is the result to return
/// right away: `Null` without arguments, `Undef`/`Null` if one argument is.
fn degenerate(args: &[Value]) -> Option<Value> {
    if args.is_empty() {
        Some(Value::Null)
    } else if args.iter().any(Value::is_undef) {
        Some(Value::Undef)
    } else if args.iter().any(Value::is_null) {
        Some(Value::Null)
    } else {
        None
    }
}

fn floats(args: &[Value]) -> Result<Vec<f64>> {
    args.iter().map(Value::fetch_float).collect()
}

fn avg(args: &[Value]) -> Result<Value> {
    if let Some(value) = degenerate(args) {
        return Ok(value);
    }
    let values = floats(args)?;
    Ok(Value::Float(values.iter().sum::<f64>() / values.len() as f64))
}

fn rms(args: &[Value]) -> Result<Value> {
    if let Some(value) = degenerate(args) {
        return Ok(value);
    }
    let values = floats(args)?;
    Ok(Value::Float((values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt()))
}

/// The argument that wins `better` against all others, first one on ties.
fn select(args: &[Value], better: fn(f64, f64) -> bool) -> Result<Value> {
    if let Some(value) = degenerate(args) {
        return Ok(value);
    }
    let values = floats(args)?;
    let mut best = 0;
    for (i, &value) in values.iter().enumerate().skip(1) {
        if better(value, values[best]) {
            best = i;
        }
    }
    args[best].clone().cast_numeric()
}

fn max(args: &[Value]) -> Result<Value> {
    select(args, |a, b| a > b)
}

fn min(args: &[Value]) -> Result<Value> {
    select(args, |a, b| a < b)
}
