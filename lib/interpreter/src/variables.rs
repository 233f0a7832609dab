use std::fmt::{self, Debug, Formatter};

use errors::Result;
use itertools::Itertools;
use value::Value;

use crate::resolver::{call_builtin, Resolver};

/// A named set of values that expressions can read.
///
/// Lookups that miss fall through to the parent resolver, so hosts can layer a
/// few local variables over a larger scope. Indexed variables are stored under
/// composed names: `x[1][2]` reads the variable `x_1_2`.
#[derive(Default)]
pub struct Variables<'a> {
    // Sorted by name
    values: Vec<(String, Value)>,
    parent: Option<&'a dyn Resolver>,
}

impl Debug for Variables<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variables")
            .field("values", &self.values)
            .field("parent", &self.parent.is_some())
            .finish()
    }
}

/// The key an indexed lookup reads, `x` with `[1, 2]` is `x_1_2`.
pub fn indexed_name(name: &str, indices: &[i64]) -> String {
    if indices.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", name, indices.iter().join("_"))
    }
}

impl<'a> Variables<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(parent: &'a dyn Resolver) -> Self {
        Self { values: Vec::new(), parent: Some(parent) }
    }

    fn find(&self, name: &str) -> std::result::Result<usize, usize> {
        self.values.binary_search_by(|(key, _)| key.as_str().cmp(name))
    }

    /// Defines or replaces `name`, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.find(&name) {
            Ok(i) => Some(std::mem::replace(&mut self.values[i].1, value)),
            Err(i) => {
                self.values.insert(i, (name, value));
                None
            }
        }
    }

    pub fn set_int(&mut self, name: impl Into<String>, value: i64) -> Option<Value> {
        self.set(name, Value::Int(value))
    }

    pub fn set_float(&mut self, name: impl Into<String>, value: f64) -> Option<Value> {
        self.set(name, Value::Float(value))
    }

    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) -> Option<Value> {
        self.set(name, Value::Bool(value))
    }

    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<Value> {
        self.set(name, Value::Str(value.into()))
    }

    pub fn set_null(&mut self, name: impl Into<String>) -> Option<Value> {
        self.set(name, Value::Null)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.find(name).ok().map(|i| &self.values[i].1)
    }

    pub fn unset(&mut self, name: &str) -> Option<Value> {
        self.find(name).ok().map(|i| self.values.remove(i).1)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn resolver(&self) -> Option<&'a dyn Resolver> {
        self.parent
    }

    pub fn set_resolver(&mut self, parent: Option<&'a dyn Resolver>) {
        self.parent = parent;
    }
}

impl Resolver for Variables<'_> {
    fn resolve(&self, name: &str, indices: &[i64]) -> Result<Value> {
        if let Some(value) = self.get(&indexed_name(name, indices)) {
            return Ok(value.clone());
        }

        match self.parent {
            Some(parent) => parent.resolve(name, indices),
            None => {
                log::trace!("Variable {name}{indices:?} is not set, using null");
                Ok(Value::Null)
            }
        }
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        match self.parent {
            Some(parent) => parent.call(name, args),
            None => call_builtin(name, args),
        }
    }
}
