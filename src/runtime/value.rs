//! The in-memory value model

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::descriptor::TypeTag;
use crate::error::{Error, Result};
use crate::hook::HookValue;

/// Runtime value representation
///
/// The domain both compilers operate over: a superset of the JSON tree
/// (bytes, timestamps, tuples, non-string-keyed mappings, and hook values
/// exist here but not on the wire). Mappings are ordered pair lists so key
/// order survives a round trip.
#[derive(Debug, Clone)]
pub enum Value {
    // Primitives
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit integer value
    Int(i64),
    /// 64-bit floating-point value
    Float(f64),
    /// String value
    Str(String),

    // Non-JSON scalars
    /// Byte string; base64 text on the wire
    Bytes(Vec<u8>),
    /// Point in time; ISO-8601 text on the wire
    Timestamp(DateTime<Utc>),

    // Collections
    /// Fixed-arity heterogeneous tuple
    Tuple(Vec<Value>),
    /// Homogeneous sequence
    Array(Vec<Value>),
    /// Ordered mapping; keys may be any value
    Map(Vec<(Value, Value)>),

    /// Instance of a user type with codegen routines
    Hook(Arc<dyn HookValue>),
}

impl Value {
    /// Creates a string value
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Creates a tuple value
    pub fn tuple(values: Vec<Value>) -> Self {
        Value::Tuple(values)
    }

    /// Creates an array value
    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(values)
    }

    /// Creates a mapping value from ordered pairs
    pub fn map(pairs: Vec<(Value, Value)>) -> Self {
        Value::Map(pairs)
    }

    /// Returns the type name as a string
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "str".to_string(),
            Value::Bytes(_) => "bytes".to_string(),
            Value::Timestamp(_) => "timestamp".to_string(),
            Value::Tuple(_) => "tuple".to_string(),
            Value::Array(_) => "array".to_string(),
            Value::Map(_) => "map".to_string(),
            Value::Hook(h) => h.class().name().to_string(),
        }
    }

    /// Effective base classification, as tested by union dispatch
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Str(_) => TypeTag::Str,
            Value::Bytes(_) => TypeTag::Bytes,
            Value::Timestamp(_) => TypeTag::Timestamp,
            Value::Tuple(_) => TypeTag::Tuple,
            Value::Array(_) => TypeTag::Array,
            Value::Map(_) => TypeTag::Map,
            Value::Hook(h) => TypeTag::Hook(h.class().name()),
        }
    }

    /// Converts value to a 64-bit integer
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(n) => Ok(*n),
            _ => Err(Error::type_mismatch("int", self.type_name())),
        }
    }

    /// Returns a reference to the string value
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::Str(s) => Ok(s),
            _ => Err(Error::type_mismatch("str", self.type_name())),
        }
    }

    /// Returns a reference to the byte string
    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            Value::Bytes(b) => Ok(b),
            _ => Err(Error::type_mismatch("bytes", self.type_name())),
        }
    }

    /// Returns the elements of an array or tuple
    pub fn as_items(&self) -> Result<&[Value]> {
        match self {
            Value::Array(items) | Value::Tuple(items) => Ok(items),
            _ => Err(Error::type_mismatch("array or tuple", self.type_name())),
        }
    }

    /// Returns the ordered pairs of a mapping
    pub fn as_map(&self) -> Result<&[(Value, Value)]> {
        match self {
            Value::Map(pairs) => Ok(pairs),
            _ => Err(Error::type_mismatch("map", self.type_name())),
        }
    }

    /// Gets an element from an array or tuple by index
    pub fn get_index(&self, index: usize) -> Result<Value> {
        let items = self.as_items()?;
        items
            .get(index)
            .cloned()
            .ok_or(Error::IndexOutOfBounds {
                index,
                length: items.len(),
            })
    }

    /// Replaces an element of an array or tuple in place
    pub fn set_index(&mut self, index: usize, value: Value) -> Result<()> {
        match self {
            Value::Array(items) | Value::Tuple(items) => {
                let length = items.len();
                match items.get_mut(index) {
                    Some(slot) => {
                        *slot = value;
                        Ok(())
                    }
                    None => Err(Error::IndexOutOfBounds { index, length }),
                }
            }
            _ => Err(Error::type_mismatch("array or tuple", self.type_name())),
        }
    }

    /// Looks up a mapping entry by key
    pub fn map_get(&self, key: &Value) -> Result<Value> {
        let pairs = self.as_map()?;
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| Error::KeyNotFound {
                key: key.to_string(),
            })
    }

    /// Inserts or replaces a mapping entry, preserving insertion order
    pub fn map_insert(&mut self, key: Value, value: Value) -> Result<()> {
        match self {
            Value::Map(pairs) => {
                if let Some(slot) = pairs.iter_mut().find(|(k, _)| *k == key) {
                    slot.1 = value;
                } else {
                    pairs.push((key, value));
                }
                Ok(())
            }
            _ => Err(Error::type_mismatch("map", self.type_name())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, val) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, ")")
            }
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, val) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, "]")
            }
            Value::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (key, val)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, val)?;
                }
                write!(f, "}}")
            }
            Value::Hook(h) => write!(f, "<{}>", h.class().name()),
        }
    }
}

// Hook values compare structurally through their own eq_dyn
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Hook(a), Value::Hook(b)) => a.eq_dyn(b.as_ref()),
            _ => false,
        }
    }
}
