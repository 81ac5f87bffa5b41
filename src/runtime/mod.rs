//! Runtime values and their JSON boundary
//!
//! Module layout:
//! - [`value`]: the in-memory value model (a superset of JSON)
//! - [`json`]: conversion between values and JSON at the wire boundary
//! - [`blind`]: reflective serialization for untyped values

pub mod blind;
pub mod json;
pub mod value;

pub use json::{from_json, to_json};
pub use value::Value;
