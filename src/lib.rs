//! Type-directed JSON serialization through generated conversion programs
//!
//! Given a declarative type expression, typewire compiles a small program
//! that converts values of that type to a JSON-representable wire shape,
//! and a mirror program that converts back. The programs are ordinary data
//! (an indented statement list plus a table of captured constants), render
//! to readable text for diagnostics, and execute directly.
//!
//! ```
//! use typewire::{deserialize, serialize, TypeExpr, Value};
//!
//! let ty = TypeExpr::tuple([TypeExpr::int(), TypeExpr::string()]);
//! let value = Value::tuple(vec![Value::Int(1), Value::str("one")]);
//!
//! let wire = serialize(&value, Some(&ty))?;
//! assert_eq!(wire, serde_json::json!([1, "one"]));
//!
//! let back = deserialize(&wire, &ty)?;
//! assert_eq!(back, value);
//! # Ok::<(), typewire::Error>(())
//! ```
//!
//! Values beyond JSON (bytes, timestamps, tuples, non-string-keyed
//! mappings, user hook types) get explicit wire encodings; unions encode as
//! `[member_index, payload]` pairs so decoding never guesses. When no type
//! is available, [`serialize`] falls back to reflective conversion driven
//! by the value itself.

#![warn(missing_docs)]

pub mod codegen;
pub mod compile;
pub mod descriptor;
pub mod error;
pub mod hook;
pub mod runtime;
pub mod store;

pub use codegen::{Capability, CompiledRoutine, Constant, ProgramBuilder};
pub use compile::{compile_deserializer, compile_serializer, deserialize, serialize};
pub use descriptor::{Primitive, TypeExpr};
pub use error::{Error, ErrorKind, Result};
pub use hook::{HookType, HookValue};
pub use runtime::Value;
pub use store::FileStore;
