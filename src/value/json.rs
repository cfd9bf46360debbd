//! Conversion of serializable contexts into [`Value`]s.

use crate::{Error, Result, Value};

/// Convert a type implementing [`serde::Serialize`] to a [`Value`].
pub fn to_value<S>(s: S) -> Result<Value>
where
    S: serde::Serialize,
{
    let json = serde_json::to_value(s)?;
    Ok(Value::from(json))
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(list) => {
                Value::List(list.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Converts a serialized context into the map of variables it provides.
pub(crate) fn to_context<S>(s: S) -> Result<crate::value::Map<String, Value>>
where
    S: serde::Serialize,
{
    match to_value(s)? {
        Value::Map(map) => Ok(map),
        Value::None => Ok(Default::default()),
        value => Err(Error::type_error(format!(
            "expected the context to serialize to a map, found {}",
            value.human()
        ))),
    }
}
