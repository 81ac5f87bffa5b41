//! Captured runtime constants
//!
//! Some things a generated program needs (class tags for type tests,
//! constructors for rebuilding concrete collection types, codec functions)
//! cannot be represented as program text. They live in a side table keyed
//! by synthetic names; generated statements reference the names, and the
//! finalized routine binds the table into its execution environment.

use std::fmt;
use std::sync::Arc;

use crate::descriptor::TypeTag;
use crate::error::Result;
use crate::runtime::Value;

/// A constant-table function: constructors and codecs callable from
/// generated `Call` expressions
pub type ConstFn = dyn Fn(&[Value]) -> Result<Value> + Send + Sync;

/// An entry in the constant table
#[derive(Clone)]
pub enum Constant {
    /// A class tag, consulted by `isinstance` conditions
    Class(TypeTag),
    /// A function, invoked by `Call` expressions
    Func(Arc<ConstFn>),
    /// A plain value
    Value(Value),
}

impl fmt::Debug for Constant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Constant::Class(tag) => write!(f, "Class({:?})", tag),
            Constant::Func(_) => write!(f, "Func(..)"),
            Constant::Value(v) => write!(f, "Value({:?})", v),
        }
    }
}
