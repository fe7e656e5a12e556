// JSON interop for values

use crate::data::Value;
use bstr::ByteSlice;
use serde_json::{Map, Number};

impl From<&serde_json::Value> for Value {
    /// Arrays become lists and objects become maps with string keys
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from).collect()),
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (Value::Str(k.clone()), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Value {
    /// JSON rendering. Records render through [`crate::record::Instance::as_map`]
    /// when all their fields are set; non-string map keys render as their repr.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::None => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(b) => serde_json::Value::String(b.to_str_lossy().into_owned()),
            Value::Tuple(items) | Value::List(items) | Value::Set(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(pairs) => {
                let mut object = Map::new();
                for (key, value) in pairs {
                    let key = match key {
                        Value::Str(s) => s.clone(),
                        other => other.repr(),
                    };
                    object.insert(key, value.to_json());
                }
                serde_json::Value::Object(object)
            }
            Value::Record(instance) => match instance.as_map() {
                Ok(map) => map.to_json(),
                Err(_) => serde_json::Value::String(instance.repr()),
            },
        }
    }
}
