//! Extension traits that let user-defined types participate in code generation
//!
//! A type joins the compiler by supplying two codegen routines, one per
//! direction. Each receives the bindings it must read from and write to,
//! plus the shared [`ProgramBuilder`], and emits its own statements; the
//! compiler recurses into them like any built-in descriptor kind.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::codegen::ProgramBuilder;
use crate::error::Result;
use crate::runtime::Value;

/// A user type's codegen routines
///
/// The same `(in_binding, out_binding, builder)` contract the built-in
/// compilers use: after the emitted statements run, `out_binding` holds the
/// converted form of `in_binding`.
pub trait HookType: fmt::Debug + Send + Sync {
    /// Stable name of the type; doubles as its base classification for
    /// union dispatch, so two distinct hook types may share a union
    fn name(&self) -> &'static str;

    /// Emit statements converting a value of this type to its wire form
    fn emit_serializer(
        &self,
        in_var: &str,
        out_var: &str,
        builder: &mut ProgramBuilder,
    ) -> Result<()>;

    /// Emit statements reconstructing a value of this type from its wire form
    fn emit_deserializer(
        &self,
        in_var: &str,
        out_var: &str,
        builder: &mut ProgramBuilder,
    ) -> Result<()>;
}

/// A runtime instance of a hook type
///
/// Generated programs interact with hook values through field access; the
/// class handle ties the instance back to its codegen routines (the blind
/// serializer uses it to compile on the fly).
pub trait HookValue: fmt::Debug + Send + Sync {
    /// The codegen class this instance belongs to
    fn class(&self) -> Arc<dyn HookType>;

    /// Read a named field, as used by generated field-access expressions
    fn get(&self, field: &str) -> Result<Value>;

    /// Downcast support for callers that know the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Structural equality against another hook value
    fn eq_dyn(&self, other: &dyn HookValue) -> bool;
}
