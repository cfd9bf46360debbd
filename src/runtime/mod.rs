//! Symbol resolution across named module paths.
//!
//! Scripts reach symbols outside themselves through an [`Environment`]. A
//! symbol carries its namespace as a prefix: `%name` for hypertags and
//! `$name` for variables.

mod builtins;

use std::collections::BTreeMap;
use std::fmt;

use crate::tag::{Hypertag, Registry, HTML};
use crate::value::Map;
use crate::{Error, Result, Value};

/// The path of the module holding the builtin tags and functions.
pub const BUILTINS: &str = "builtins";

/// The collaborator that resolves imported symbols.
pub trait Environment: fmt::Debug {
    /// Returns the value of one symbol of the module at `path`.
    fn import_one(&self, symbol: &str, path: &str) -> Result<Value>;

    /// Returns every public symbol of the module at `path`.
    ///
    /// Symbols whose name starts with an underscore are private.
    fn import_all(&self, path: &str) -> Result<Map<String, Value>>;

    /// Returns the symbols every script starts with.
    fn import_default(&self) -> Result<Map<String, Value>>;
}

/// An in-memory [`Environment`].
///
/// # Examples
///
/// ```
/// use hypertag::{Environment, Runtime, Value};
///
/// let mut runtime = Runtime::new();
/// runtime.add_module("site", [("$title", Value::from("Home"))])?;
/// assert_eq!(runtime.import_one("$title", "site")?, Value::from("Home"));
/// # Ok::<(), hypertag::Error>(())
/// ```
#[derive(Debug)]
pub struct Runtime {
    modules: BTreeMap<String, Map<String, Value>>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// Constructs a runtime over the HTML tag registry.
    pub fn new() -> Self {
        Self::with_registry(&HTML)
    }

    /// Constructs a runtime whose builtins expose the tags of `registry`.
    pub fn with_registry(registry: &Registry) -> Self {
        let mut builtins = Map::new();
        for (name, tag) in registry.iter() {
            builtins.insert(
                format!("%{name}"),
                Value::Hypertag(Hypertag::External(tag.clone())),
            );
        }
        for function in builtins::all() {
            builtins.insert(format!("${}", function.name()), Value::Function(function));
        }
        let mut modules = BTreeMap::new();
        modules.insert(BUILTINS.to_owned(), builtins);
        Self { modules }
    }

    /// Registers the module at `path`, extending it if it exists.
    ///
    /// Every symbol must be an identifier prefixed with `%` or `$`, and
    /// `%` symbols must hold hypertags.
    pub fn add_module<I, S, V>(&mut self, path: &str, symbols: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<Value>,
    {
        let mut checked = Vec::new();
        for (symbol, value) in symbols {
            let symbol = symbol.into();
            let value = value.into();
            check_symbol(&symbol, &value)?;
            checked.push((symbol, value));
        }
        tracing::debug!(path, symbols = checked.len(), "registering module");
        self.modules
            .entry(path.to_owned())
            .or_default()
            .extend(checked);
        Ok(())
    }

    fn module(&self, path: &str) -> Result<&Map<String, Value>> {
        self.modules.get(path).ok_or_else(|| Error::import(path))
    }
}

impl Environment for Runtime {
    fn import_one(&self, symbol: &str, path: &str) -> Result<Value> {
        self.module(path)?
            .get(symbol)
            .cloned()
            .ok_or_else(|| Error::undefined(symbol))
    }

    fn import_all(&self, path: &str) -> Result<Map<String, Value>> {
        let module = self.module(path)?;
        Ok(module
            .iter()
            .filter(|(symbol, _)| !is_private(symbol))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn import_default(&self) -> Result<Map<String, Value>> {
        self.import_all(BUILTINS)
    }
}

fn is_private(symbol: &str) -> bool {
    symbol.get(1..).map_or(false, |name| name.starts_with('_'))
}

fn check_symbol(symbol: &str, value: &Value) -> Result<()> {
    let name = match (symbol.strip_prefix('%'), symbol.strip_prefix('$')) {
        (Some(name), _) => {
            if !matches!(value, Value::Hypertag(_)) {
                return Err(Error::type_error(format!(
                    "symbol `{symbol}` must hold a hypertag, found {}",
                    value.human()
                )));
            }
            name
        }
        (None, Some(name)) => name,
        (None, None) => {
            return Err(Error::type_error(format!(
                "symbol `{symbol}` must start with `%` or `$`"
            )));
        }
    };
    if !is_ident(name) {
        return Err(Error::type_error(format!(
            "symbol `{symbol}` is not a valid identifier"
        )));
    }
    Ok(())
}

#[cfg(feature = "unicode")]
fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .map_or(false, |c| c == '_' || unicode_ident::is_xid_start(c))
        && chars.all(|c| c == '-' || unicode_ident::is_xid_continue(c))
}

#[cfg(not(feature = "unicode"))]
fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .map_or(false, |c| c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c == '-' || c.is_ascii_alphanumeric())
}
