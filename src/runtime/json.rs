//! The JSON wire boundary
//!
//! Compiled serializers lower every value into the JSON-compatible subset
//! of [`Value`]; this module is the final hop onto `serde_json::Value` and
//! the first hop back. Bytes, timestamps, and hook values reaching
//! [`to_json`] directly are an error: a serializer should have encoded
//! them already.

use serde_json::{Map as JsonMap, Number, Value as Json};

use crate::error::{Error, Result};
use crate::runtime::Value;

/// Encode the JSON-compatible subset of [`Value`] as a `serde_json` tree
///
/// Tuples and arrays both become JSON arrays. A mapping with all-string
/// keys becomes a JSON object (insertion order preserved); any other
/// mapping becomes an array of `[key, value]` pairs, since JSON objects
/// cannot carry non-string keys.
pub fn to_json(value: &Value) -> Result<Json> {
    match value {
        Value::Null => Ok(Json::Null),
        Value::Bool(b) => Ok(Json::Bool(*b)),
        Value::Int(n) => Ok(Json::Number(Number::from(*n))),
        Value::Float(f) => Number::from_f64(*f)
            .map(Json::Number)
            .ok_or(Error::NonFiniteFloat),
        Value::Str(s) => Ok(Json::String(s.clone())),
        Value::Tuple(items) | Value::Array(items) => {
            items.iter().map(to_json).collect::<Result<Vec<_>>>().map(Json::Array)
        }
        Value::Map(pairs) => {
            if pairs.iter().all(|(k, _)| matches!(k, Value::Str(_))) {
                let mut object = JsonMap::new();
                for (key, val) in pairs {
                    object.insert(key.as_str()?.to_string(), to_json(val)?);
                }
                Ok(Json::Object(object))
            } else {
                let mut rows = Vec::with_capacity(pairs.len());
                for (key, val) in pairs {
                    rows.push(Json::Array(vec![to_json(key)?, to_json(val)?]));
                }
                Ok(Json::Array(rows))
            }
        }
        Value::Bytes(_) | Value::Timestamp(_) | Value::Hook(_) => {
            Err(Error::NotWireRepresentable {
                type_name: value.type_name(),
            })
        }
    }
}

/// Decode a `serde_json` tree into the JSON-compatible subset of [`Value`]
///
/// Numbers become `Int` when they fit in an `i64`, `Float` otherwise.
/// Objects become string-keyed mappings with key order preserved.
pub fn from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Json::String(s) => Value::Str(s.clone()),
        Json::Array(items) => Value::Array(items.iter().map(from_json).collect()),
        Json::Object(fields) => Value::Map(
            fields
                .iter()
                .map(|(k, v)| (Value::str(k.clone()), from_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_round_trip() {
        for v in [
            Value::Null,
            Value::Bool(true),
            Value::Int(-3),
            Value::Float(2.5),
            Value::str("hi"),
        ] {
            let j = to_json(&v).unwrap();
            assert_eq!(from_json(&j), v);
        }
    }

    #[test]
    fn test_string_keyed_map_becomes_object_in_order() {
        let m = Value::map(vec![
            (Value::str("b"), Value::Int(1)),
            (Value::str("a"), Value::Int(2)),
        ]);
        let j = to_json(&m).unwrap();
        assert_eq!(serde_json::to_string(&j).unwrap(), r#"{"b":1,"a":2}"#);
    }

    #[test]
    fn test_non_string_keyed_map_becomes_pair_array() {
        let m = Value::map(vec![(Value::Int(1), Value::str("one"))]);
        let j = to_json(&m).unwrap();
        assert_eq!(j, json!([[1, "one"]]));
    }

    #[test]
    fn test_tuple_becomes_plain_array() {
        let t = Value::tuple(vec![Value::Int(1), Value::str("a")]);
        assert_eq!(to_json(&t).unwrap(), json!([1, "a"]));
    }

    #[test]
    fn test_bytes_rejected_at_boundary() {
        let err = to_json(&Value::Bytes(vec![0x61])).unwrap_err();
        assert!(matches!(err, Error::NotWireRepresentable { .. }));
    }
}
