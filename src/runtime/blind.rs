//! Reflective fallback serialization
//!
//! Used when no type expression is supplied: the value's own shape drives
//! the conversion. Slower and less precise than compiled serialization
//! (mapping keys that are not text degrade to their JSON rendering), but it
//! handles any serializable value.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::compile::compile_serializer;
use crate::descriptor::TypeExpr;
use crate::error::Result;
use crate::runtime::json::to_json;
use crate::runtime::Value;

/// Serialize a value into its wire shape with no type information
pub fn serialize_blind(value: &Value) -> Result<Value> {
    match value {
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) => {
            Ok(value.clone())
        }
        Value::Bytes(bytes) => Ok(Value::Str(BASE64.encode(bytes))),
        Value::Timestamp(ts) => Ok(Value::Str(ts.to_rfc3339())),
        Value::Tuple(items) => items.iter().map(serialize_blind).collect::<Result<_>>().map(Value::Tuple),
        Value::Array(items) => items.iter().map(serialize_blind).collect::<Result<_>>().map(Value::Array),
        Value::Map(pairs) => {
            let mut out = Vec::with_capacity(pairs.len());
            for (key, val) in pairs {
                out.push((blind_key(key)?, serialize_blind(val)?));
            }
            Ok(Value::Map(out))
        }
        // A hook value knows its class; compile its serializer on the fly
        Value::Hook(h) => {
            let routine = compile_serializer(&TypeExpr::hook(h.class()))?;
            routine.invoke(value.clone())
        }
    }
}

/// Keys serialize like any other value, but a non-text result degrades to
/// its JSON text so the enclosing mapping can still become a JSON object
fn blind_key(key: &Value) -> Result<Value> {
    match serialize_blind(key)? {
        text @ Value::Str(_) => Ok(text),
        other => Ok(Value::Str(to_json(&other)?.to_string())),
    }
}
