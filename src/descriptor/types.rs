//! The user-facing type expression algebra

use std::fmt;
use std::sync::Arc;

use crate::hook::HookType;

/// Scalar classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Text
    Str,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    /// Boolean
    Bool,
    /// The null/absent value
    Null,
}

/// A declarative description of a value's shape
///
/// This is the input to the compilers. Expressions nest arbitrarily;
/// recursion always narrows (self-referential descriptors cannot be
/// constructed, there is no indirection back to an enclosing expression).
#[derive(Debug, Clone)]
pub enum TypeExpr {
    /// A scalar: str, int, float, bool, or null
    Primitive(Primitive),
    /// A value that may also be null
    Optional(Box<TypeExpr>),
    /// One of several alternatives, dispatched by runtime classification
    Union(Vec<TypeExpr>),
    /// Fixed-arity heterogeneous tuple
    Tuple(Vec<TypeExpr>),
    /// Homogeneous sequence of unbounded length
    Sequence(Box<TypeExpr>),
    /// Homogeneous tuple of unbounded length (`tuple[T, ...]`); encodes
    /// like a sequence but reconstructs a tuple
    VariadicTuple(Box<TypeExpr>),
    /// Mapping from key type to value type
    Mapping(Box<TypeExpr>, Box<TypeExpr>),
    /// Byte string, carried on the wire as base64 text
    Bytes,
    /// Point in time, carried on the wire as ISO-8601 text
    Timestamp,
    /// A user type with its own codegen routines
    Hook(Arc<dyn HookType>),
    /// An externally-defined type the compiler has no handling for;
    /// normalizes to `Kind::Unknown` and fails at build time
    Opaque(&'static str),
}

impl TypeExpr {
    /// Shorthand for the string primitive
    pub fn string() -> Self {
        TypeExpr::Primitive(Primitive::Str)
    }

    /// Shorthand for the integer primitive
    pub fn int() -> Self {
        TypeExpr::Primitive(Primitive::Int)
    }

    /// Shorthand for the float primitive
    pub fn float() -> Self {
        TypeExpr::Primitive(Primitive::Float)
    }

    /// Shorthand for the boolean primitive
    pub fn boolean() -> Self {
        TypeExpr::Primitive(Primitive::Bool)
    }

    /// Shorthand for the null primitive
    pub fn null() -> Self {
        TypeExpr::Primitive(Primitive::Null)
    }

    /// Wrap in an optional
    pub fn optional(inner: TypeExpr) -> Self {
        TypeExpr::Optional(Box::new(inner))
    }

    /// Homogeneous sequence of `elem`
    pub fn sequence(elem: TypeExpr) -> Self {
        TypeExpr::Sequence(Box::new(elem))
    }

    /// Mapping from `key` to `value`
    pub fn mapping(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Mapping(Box::new(key), Box::new(value))
    }

    /// Union of the given members, in declaration order
    pub fn union(members: impl IntoIterator<Item = TypeExpr>) -> Self {
        TypeExpr::Union(members.into_iter().collect())
    }

    /// Fixed-arity tuple of the given element types
    pub fn tuple(elems: impl IntoIterator<Item = TypeExpr>) -> Self {
        TypeExpr::Tuple(elems.into_iter().collect())
    }

    /// Hook-bearing user type
    pub fn hook(class: Arc<dyn HookType>) -> Self {
        TypeExpr::Hook(class)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeExpr::Primitive(Primitive::Str) => write!(f, "str"),
            TypeExpr::Primitive(Primitive::Int) => write!(f, "int"),
            TypeExpr::Primitive(Primitive::Float) => write!(f, "float"),
            TypeExpr::Primitive(Primitive::Bool) => write!(f, "bool"),
            TypeExpr::Primitive(Primitive::Null) => write!(f, "null"),
            TypeExpr::Optional(inner) => write!(f, "optional[{}]", inner),
            TypeExpr::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
            TypeExpr::Tuple(elems) => {
                write!(f, "tuple[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "]")
            }
            TypeExpr::Sequence(elem) => write!(f, "list[{}]", elem),
            TypeExpr::VariadicTuple(elem) => write!(f, "tuple[{}, ...]", elem),
            TypeExpr::Mapping(key, value) => write!(f, "dict[{}, {}]", key, value),
            TypeExpr::Bytes => write!(f, "bytes"),
            TypeExpr::Timestamp => write!(f, "timestamp"),
            TypeExpr::Hook(class) => write!(f, "{}", class.name()),
            TypeExpr::Opaque(name) => write!(f, "opaque[{}]", name),
        }
    }
}
