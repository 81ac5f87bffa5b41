//! Type-directed compilation and the crate's conversion entry points
//!
//! Module layout:
//! - [`serializer`]: emits serialization statements for a type expression
//! - [`deserializer`]: emits the mirror-image decoding statements
//!
//! Entry points build a fresh routine on every call. Compilation cost is
//! proportional to the type expression, not to the value; callers that
//! convert many values of one type can compile once and invoke repeatedly.

pub mod deserializer;
pub mod serializer;

use tracing::debug;

use crate::codegen::{CompiledRoutine, ProgramBuilder};
use crate::descriptor::TypeExpr;
use crate::error::Result;
use crate::runtime::{blind, from_json, to_json, Value};

pub use deserializer::emit_deserializer;
pub use serializer::emit_serializer;

/// Entry binding of every compiled routine
pub const ENTRY: &str = "inp";
/// Exit binding of every compiled routine
pub const EXIT: &str = "out";

/// Build a routine converting values of `ty` into their wire shape
pub fn compile_serializer(ty: &TypeExpr) -> Result<CompiledRoutine> {
    let mut g = ProgramBuilder::new();
    emit_serializer(Some(ty), ENTRY, EXIT, &mut g)?;
    debug!(ty = %ty, statements = g.len(), "compiled serializer");
    g.finalize(format!("<serializer for {}>", ty), ENTRY, EXIT)
}

/// Build a routine converting wire-shaped values back into values of `ty`
pub fn compile_deserializer(ty: &TypeExpr) -> Result<CompiledRoutine> {
    let mut g = ProgramBuilder::new();
    emit_deserializer(Some(ty), ENTRY, EXIT, &mut g)?;
    debug!(ty = %ty, statements = g.len(), "compiled deserializer");
    g.finalize(format!("<deserializer for {}>", ty), ENTRY, EXIT)
}

/// Serialize one value to JSON
///
/// With a type, compiles and runs a serializer for it. Without one, falls
/// back to reflective serialization driven by the value's own shape.
pub fn serialize(value: &Value, ty: Option<&TypeExpr>) -> Result<serde_json::Value> {
    let wire = match ty {
        Some(ty) => compile_serializer(ty)?.invoke(value.clone())?,
        None => blind::serialize_blind(value)?,
    };
    to_json(&wire)
}

/// Deserialize one JSON value as `ty`
///
/// There is no blind counterpart: wire data does not carry enough
/// information to reconstruct tuples, bytes, timestamps, or hook values.
pub fn deserialize(wire: &serde_json::Value, ty: &TypeExpr) -> Result<Value> {
    compile_deserializer(ty)?.invoke(from_json(wire))
}
