//! # Type descriptor algebra
//!
//! The compiler never inspects runtime values to decide what code to emit;
//! it is driven entirely by an explicit, statically defined description of
//! the value's shape.
//!
//! ```text
//! descriptor/
//! ├── mod.rs        # This file - module definition and re-exports
//! ├── types.rs      # Primitive, TypeExpr (the user-facing algebra)
//! └── normalize.rs  # Descriptor, Kind, TypeTag, normalize()
//! ```
//!
//! [`TypeExpr`] is what callers build; [`normalize`] turns any expression
//! (including an absent one) into a canonical `(kind, args)` pair, and is
//! invoked at every recursive step of compilation, not once at the root.

mod normalize;
mod types;

pub use normalize::{normalize, type_tag, Descriptor, Kind, TypeTag};
pub use types::{Primitive, TypeExpr};
