//! Builtin functions.
//!
//! Every function receives the filtered value as its first argument followed
//! by the arguments written after the function name.

use crate::value::Function;
use crate::{Error, Result, Value};

pub(crate) fn all() -> Vec<Function> {
    vec![
        Function::new("lower", lower),
        Function::new("upper", upper),
        Function::new("replace", replace),
        Function::new("first", first),
        Function::new("last", last),
        Function::new("len", len),
        Function::new("reverse", reverse),
        Function::new("default", default),
        Function::new("get", get),
        Function::new("join", join),
    ]
}

/// Returns the lowercase equivalent of a string.
fn lower(args: &[Value]) -> Result<Value> {
    let [s] = expect::<1>("lower", args)?;
    Ok(Value::String(string("lower", s)?.to_lowercase()))
}

/// Returns the uppercase equivalent of a string.
fn upper(args: &[Value]) -> Result<Value> {
    let [s] = expect::<1>("upper", args)?;
    Ok(Value::String(string("upper", s)?.to_uppercase()))
}

/// Replaces all matches of a substring with another substring in a string.
fn replace(args: &[Value]) -> Result<Value> {
    let [s, from, to] = expect::<3>("replace", args)?;
    let s = string("replace", s)?;
    Ok(Value::String(
        s.replace(string("replace", from)?, string("replace", to)?),
    ))
}

/// Returns the first element in a list, or none.
fn first(args: &[Value]) -> Result<Value> {
    let [list] = expect::<1>("first", args)?;
    match list {
        Value::List(list) => Ok(list.first().cloned().unwrap_or(Value::None)),
        value => Err(unsupported("first", value)),
    }
}

/// Returns the last element in a list, or none.
fn last(args: &[Value]) -> Result<Value> {
    let [list] = expect::<1>("last", args)?;
    match list {
        Value::List(list) => Ok(list.last().cloned().unwrap_or(Value::None)),
        value => Err(unsupported("last", value)),
    }
}

/// Returns the number of characters in a string, elements in a list or
/// map, or nodes in a sequence.
fn len(args: &[Value]) -> Result<Value> {
    let [value] = expect::<1>("len", args)?;
    let n = match value {
        Value::String(s) => s.chars().count(),
        Value::List(l) => l.len(),
        Value::Map(m) => m.len(),
        Value::Nodes(seq) => seq.len(),
        value => return Err(unsupported("len", value)),
    };
    Ok(Value::from(n))
}

/// Reverses a list or string.
fn reverse(args: &[Value]) -> Result<Value> {
    let [value] = expect::<1>("reverse", args)?;
    match value {
        Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
        Value::List(list) => Ok(Value::List(list.iter().rev().cloned().collect())),
        value => Err(unsupported("reverse", value)),
    }
}

/// If the value is none returns the given default instead, otherwise
/// returns the value.
fn default(args: &[Value]) -> Result<Value> {
    let [value, default] = expect::<2>("default", args)?;
    match value {
        Value::None => Ok(default.clone()),
        value => Ok(value.clone()),
    }
}

/// Looks up an element in a list or value in a map.
///
/// Maps none to none so that it can be chained.
fn get(args: &[Value]) -> Result<Value> {
    let [value, key] = expect::<2>("get", args)?;
    match (value, key) {
        (Value::None, _) => Ok(Value::None),
        (Value::List(list), Value::Integer(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| list.get(i))
            .cloned()
            .unwrap_or(Value::None)),
        (Value::Map(map), Value::String(s)) => Ok(map.get(s).cloned().unwrap_or(Value::None)),
        (Value::List(_), k) => Err(Error::type_error(format!(
            "cannot index into list with {}",
            k.human()
        ))),
        (Value::Map(_), k) => Err(Error::type_error(format!(
            "cannot index into map with {}",
            k.human()
        ))),
        (value, _) => Err(Error::type_error(format!(
            "cannot index into {}",
            value.human()
        ))),
    }
}

/// Joins the elements of a list with a separator.
fn join(args: &[Value]) -> Result<Value> {
    let [list, sep] = expect::<2>("join", args)?;
    let sep = string("join", sep)?;
    match list {
        Value::List(items) => {
            let parts = items.iter().map(Value::to_text).collect::<Result<Vec<_>>>()?;
            Ok(Value::String(parts.join(sep)))
        }
        value => Err(unsupported("join", value)),
    }
}

fn expect<'a, const N: usize>(name: &str, args: &'a [Value]) -> Result<&'a [Value; N]> {
    args.try_into().map_err(|_| {
        Error::type_error(format!(
            "function `{name}` expected {} argument(s), found {}",
            N,
            args.len()
        ))
    })
}

fn string<'a>(name: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        Error::type_error(format!(
            "function `{name}` expected string argument, found {}",
            value.human()
        ))
    })
}

fn unsupported(name: &str, value: &Value) -> Error {
    Error::type_error(format!(
        "function `{name}` does not support {}",
        value.human()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Result<Value> {
        let f = all().into_iter().find(|f| f.name() == name).unwrap();
        f.call(args)
    }

    #[test]
    fn builtin_strings() {
        assert_eq!(call("lower", &[Value::from("HeLLo")]).unwrap(), Value::from("hello"));
        assert_eq!(call("upper", &[Value::from("HeLLo")]).unwrap(), Value::from("HELLO"));
        assert_eq!(
            call("replace", &["a-b-c".into(), "-".into(), "+".into()]).unwrap(),
            Value::from("a+b+c")
        );
    }

    #[test]
    fn builtin_lists() {
        let list = Value::from(vec![1, 2, 3]);
        assert_eq!(call("first", &[list.clone()]).unwrap(), Value::Integer(1));
        assert_eq!(call("last", &[list.clone()]).unwrap(), Value::Integer(3));
        assert_eq!(call("len", &[list.clone()]).unwrap(), Value::Integer(3));
        assert_eq!(
            call("reverse", &[list.clone()]).unwrap(),
            Value::from(vec![3, 2, 1])
        );
        assert_eq!(
            call("join", &[list, Value::from(", ")]).unwrap(),
            Value::from("1, 2, 3")
        );
        assert_eq!(call("first", &[Value::List(vec![])]).unwrap(), Value::None);
    }

    #[test]
    fn builtin_default_and_get() {
        assert_eq!(
            call("default", &[Value::None, Value::from("x")]).unwrap(),
            Value::from("x")
        );
        assert_eq!(
            call("default", &[Value::from(false), Value::from("x")]).unwrap(),
            Value::from(false)
        );
        let list = Value::from(vec!["a", "b"]);
        assert_eq!(call("get", &[list.clone(), Value::Integer(1)]).unwrap(), Value::from("b"));
        assert_eq!(call("get", &[list.clone(), Value::Integer(-1)]).unwrap(), Value::None);
        assert_eq!(call("get", &[Value::None, Value::Integer(0)]).unwrap(), Value::None);
        assert!(call("get", &[list, Value::from("x")]).is_err());
    }

    #[test]
    fn builtin_wrong_arity() {
        let err = call("lower", &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "function `lower` expected 1 argument(s), found 0"
        );
    }
}
