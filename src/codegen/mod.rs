//! Program construction and execution
//!
//! Module layout:
//! - [`program`]: statement, expression, and condition definitions
//! - [`constants`]: the side table of captured runtime constants
//! - [`builder`]: the accumulator emitters write into
//! - [`exec`]: finalized routines and their execution
//! - [`diagnostics`]: per-invocation registry of generated sources

pub mod builder;
pub mod constants;
pub mod diagnostics;
pub mod exec;
pub mod program;

pub use builder::{Capability, ProgramBuilder};
pub use constants::{ConstFn, Constant};
pub use exec::CompiledRoutine;
pub use program::{Cond, Expr, Key, Op, Place, Stmt};
