//! Canonical classification of type expressions

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::hook::HookType;

use super::types::{Primitive, TypeExpr};

/// Canonical base kind of a normalized type expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Scalar
    Primitive(Primitive),
    /// Optional wrapper; one argument
    Optional,
    /// Union; one argument per member
    Union,
    /// Fixed-arity tuple; one argument per position
    Tuple,
    /// Homogeneous sequence; exactly one argument
    Sequence,
    /// Mapping; key and value arguments
    Mapping,
    /// Byte string
    Bytes,
    /// Point in time
    Timestamp,
    /// User type with codegen routines
    Hook,
    /// Shape the compiler has no handling for
    Unknown,
}

/// A normalized `(kind, args)` pair
///
/// Produced by [`normalize`] at every recursive compilation step. The
/// original argument expressions are kept whole so the compilers can
/// recurse into them (and, for sequences, tell a plain sequence from a
/// variadic tuple when picking the reconstruction constructor).
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Canonical base kind
    pub kind: Kind,
    /// Extracted type arguments, in declaration order
    pub args: Vec<TypeExpr>,
    /// The codegen class, when `kind` is [`Kind::Hook`]
    pub hook: Option<Arc<dyn HookType>>,
}

/// Effective base classification of a type, as observable on a runtime value
///
/// Union dispatch tests values against these tags; two union members with
/// the same tag are indistinguishable at runtime and rejected at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    /// Null
    Null,
    /// Boolean
    Bool,
    /// Integer
    Int,
    /// Float
    Float,
    /// Text
    Str,
    /// Byte string
    Bytes,
    /// Timestamp
    Timestamp,
    /// Fixed or variadic tuple
    Tuple,
    /// Sequence
    Array,
    /// Mapping
    Map,
    /// Hook type, distinguished by class name
    Hook(&'static str),
}

/// Normalize an arbitrary (possibly absent) type expression
///
/// An absent type normalizes to the null primitive, so `normalize(None)`
/// and a `null` member inside a union compose uniformly. Generic wrappers
/// reduce to their kind with arguments extracted; a variadic tuple reduces
/// to a sequence.
pub fn normalize(ty: Option<&TypeExpr>) -> Descriptor {
    let Some(ty) = ty else {
        return Descriptor {
            kind: Kind::Primitive(Primitive::Null),
            args: Vec::new(),
            hook: None,
        };
    };

    let (kind, args, hook) = match ty {
        TypeExpr::Primitive(p) => (Kind::Primitive(*p), Vec::new(), None),
        TypeExpr::Optional(inner) => (Kind::Optional, vec![(**inner).clone()], None),
        TypeExpr::Union(members) => (Kind::Union, members.clone(), None),
        TypeExpr::Tuple(elems) => (Kind::Tuple, elems.clone(), None),
        TypeExpr::Sequence(elem) | TypeExpr::VariadicTuple(elem) => {
            (Kind::Sequence, vec![(**elem).clone()], None)
        }
        TypeExpr::Mapping(key, value) => (
            Kind::Mapping,
            vec![(**key).clone(), (**value).clone()],
            None,
        ),
        TypeExpr::Bytes => (Kind::Bytes, Vec::new(), None),
        TypeExpr::Timestamp => (Kind::Timestamp, Vec::new(), None),
        TypeExpr::Hook(class) => (Kind::Hook, Vec::new(), Some(Arc::clone(class))),
        TypeExpr::Opaque(_) => (Kind::Unknown, Vec::new(), None),
    };

    Descriptor { kind, args, hook }
}

/// Effective base classification of a type expression
///
/// Fails for shapes with no single runtime classification (unions,
/// optionals, opaque types); those cannot be dispatched on inside a union.
pub fn type_tag(ty: &TypeExpr) -> Result<TypeTag> {
    match ty {
        TypeExpr::Primitive(Primitive::Null) => Ok(TypeTag::Null),
        TypeExpr::Primitive(Primitive::Bool) => Ok(TypeTag::Bool),
        TypeExpr::Primitive(Primitive::Int) => Ok(TypeTag::Int),
        TypeExpr::Primitive(Primitive::Float) => Ok(TypeTag::Float),
        TypeExpr::Primitive(Primitive::Str) => Ok(TypeTag::Str),
        TypeExpr::Bytes => Ok(TypeTag::Bytes),
        TypeExpr::Timestamp => Ok(TypeTag::Timestamp),
        TypeExpr::Tuple(_) | TypeExpr::VariadicTuple(_) => Ok(TypeTag::Tuple),
        TypeExpr::Sequence(_) => Ok(TypeTag::Array),
        TypeExpr::Mapping(_, _) => Ok(TypeTag::Map),
        TypeExpr::Hook(class) => Ok(TypeTag::Hook(class.name())),
        TypeExpr::Optional(_) | TypeExpr::Union(_) | TypeExpr::Opaque(_) => {
            Err(Error::unsupported(ty.to_string()))
        }
    }
}
