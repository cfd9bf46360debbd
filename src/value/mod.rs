//! Defines the [`Value`] enum, representing anything an expression can
//! evaluate to.

mod from;
#[cfg(feature = "serde")]
mod json;
mod lazy;

pub use std::collections::BTreeMap as Map;
use std::fmt;
use std::sync::Arc;
pub use std::vec::Vec as List;

use crate::dom::Sequence;
use crate::tag::Hypertag;
use crate::{Error, Result};

#[cfg(feature = "serde")]
pub(crate) use crate::value::json::to_context;
#[cfg(feature = "serde")]
pub use crate::value::json::to_value;
pub use crate::value::lazy::LazyValue;

/// Data and first-class objects that flow through a script.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(List<Value>),
    Map(Map<String, Value>),
    /// A sequence of document nodes, e.g. the body passed to a hypertag.
    Nodes(Sequence),
    /// A hypertag used as a value.
    Hypertag(Hypertag),
    /// A function that can be applied with the filter operator.
    Function(Function),
}

/// A function value.
///
/// The first argument is the filtered value, the rest are the arguments
/// written after the function name.
#[derive(Clone)]
pub struct Function {
    name: String,
    f: Arc<FunctionFn>,
}

pub(crate) type FunctionFn = dyn Fn(&[Value]) -> Result<Value> + Send + Sync + 'static;

impl Function {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.f)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Function").field(&self.name).finish()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(s), Self::Bool(o)) => s == o,
            (Self::Integer(s), Self::Integer(o)) => s == o,
            (Self::Float(s), Self::Float(o)) => s == o,
            (Self::String(s), Self::String(o)) => s == o,
            (Self::List(s), Self::List(o)) => s == o,
            (Self::Map(s), Self::Map(o)) => s == o,
            (Self::Function(s), Self::Function(o)) => Arc::ptr_eq(&s.f, &o.f),
            (Self::Hypertag(s), Self::Hypertag(o)) => s.same(o),
            _ => false,
        }
    }
}

impl Value {
    pub(crate) fn human(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Nodes(_) => "nodes",
            Value::Hypertag(_) => "hypertag",
            Value::Function(_) => "function",
        }
    }

    /// Whether the value counts as true in a condition.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Map(m) => !m.is_empty(),
            Value::Nodes(seq) => !seq.is_empty(),
            Value::Hypertag(_) | Value::Function(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a scalar value to the text it is written as in attributes
    /// and concatenations.
    pub(crate) fn to_text(&self) -> Result<String> {
        match self {
            Value::None => Ok(String::new()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Integer(n) => Ok(n.to_string()),
            Value::Float(n) => Ok(n.to_string()),
            Value::String(s) => Ok(s.clone()),
            value => Err(Error::type_error(format!(
                "expected a scalar value, found {}",
                value.human()
            ))),
        }
    }
}
