//! Program builder: accumulates statements, allocates names, captures
//! constants, and finalizes into a compiled routine

use std::collections::HashMap;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use tracing::trace;

use crate::error::{Error, Result};
use crate::runtime::Value;

use super::constants::{ConstFn, Constant};
use super::exec::CompiledRoutine;
use super::program::{Expr, Op, Place, Stmt};

/// External capabilities a generated program may require
///
/// Declaring a capability binds the corresponding codec functions into the
/// constant table under fixed names, so generated statements can call them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// `b64encode` / `b64decode`
    Base64,
    /// `isoformat` / `fromisoformat`
    Timestamp,
}

/// Accumulates an ordered, indented statement sequence plus the constant
/// table and variable namespace for one build
///
/// One builder per compilation; the variable counter is shared across the
/// whole build (never reset per recursion level), so every allocated name
/// is unique within the resulting program.
#[derive(Default)]
pub struct ProgramBuilder {
    statements: Vec<(usize, Stmt)>,
    current_indent: usize,
    consts: HashMap<String, Constant>,
    var_i: u32,
}

impl ProgramBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate one fresh variable name
    pub fn fresh_var(&mut self) -> String {
        let name = format!("var{}", self.var_i);
        self.var_i += 1;
        name
    }

    /// Allocate `n` fresh variable names
    pub fn fresh_vars(&mut self, n: usize) -> Vec<String> {
        (0..n).map(|_| self.fresh_var()).collect()
    }

    /// Capture a runtime constant, returning the fresh name bound to it
    pub fn bind_const(&mut self, value: Constant) -> String {
        let name = self.fresh_var();
        self.consts.insert(name.clone(), value);
        name
    }

    /// Declare that a capability must be available in the execution
    /// environment; idempotent
    pub fn ensure_capability(&mut self, capability: Capability) {
        match capability {
            Capability::Base64 => {
                self.bind_named_fn("b64encode", Arc::new(b64_encode));
                self.bind_named_fn("b64decode", Arc::new(b64_decode));
            }
            Capability::Timestamp => {
                self.bind_named_fn("isoformat", Arc::new(iso_format));
                self.bind_named_fn("fromisoformat", Arc::new(iso_parse));
            }
        }
    }

    fn bind_named_fn(&mut self, name: &str, f: Arc<ConstFn>) {
        self.consts
            .entry(name.to_string())
            .or_insert(Constant::Func(f));
    }

    /// Open an indented block
    pub fn indent(&mut self) {
        self.current_indent += 1;
    }

    /// Close the current block
    ///
    /// Always emits a placeholder line first, so a block that received no
    /// statements still finalizes to a valid program.
    pub fn dedent(&mut self) {
        debug_assert!(self.current_indent > 0, "dedent without matching indent");
        self.literal(Op::Pass);
        self.current_indent = self.current_indent.saturating_sub(1);
    }

    /// Append a raw literal statement
    pub fn literal(&mut self, op: Op) {
        self.push(Stmt::Literal(op));
    }

    /// Append an assignment
    ///
    /// A true self-assignment (the same variable on both sides) collapses
    /// to a comment line instead of being emitted literally.
    pub fn assign(&mut self, left: Place, right: Expr) {
        if let (Place::Var(l), Expr::Var(r)) = (&left, &right) {
            if l == r {
                self.literal(Op::Comment(l.clone()));
                return;
            }
        }
        self.push(Stmt::Assign { left, right });
    }

    /// Assign an expression to a fresh variable and return its name
    pub fn assign_new(&mut self, expr: Expr) -> String {
        let name = self.fresh_var();
        self.assign(Place::Var(name.clone()), expr);
        name
    }

    fn push(&mut self, stmt: Stmt) {
        self.statements.push((self.current_indent, stmt));
    }

    /// Group statements into indentation-contiguous blocks
    ///
    /// Support operation for inspection and debugging; not needed for
    /// correctness.
    pub fn blocks(&self) -> Vec<(usize, Vec<&Stmt>)> {
        let mut blocks: Vec<(usize, Vec<&Stmt>)> = Vec::new();
        let mut current: Option<usize> = None;

        for (indent, stmt) in &self.statements {
            if current != Some(*indent) {
                blocks.push((*indent, Vec::new()));
                current = Some(*indent);
            }
            blocks.last_mut().expect("pushed above").1.push(stmt);
        }

        blocks
    }

    /// Render the full program as text, one statement per line
    pub fn render(&self) -> String {
        self.statements
            .iter()
            .map(|(indent, stmt)| format!("{}{}", "    ".repeat(*indent), stmt))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of accumulated statements
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether any statements have been accumulated
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Compile the accumulated statements and constant table into a
    /// callable routine bound to the given entry/exit names
    ///
    /// Fails with a schema error when the statement list does not form
    /// well-nested blocks (an emitter bug, not a value problem).
    pub fn finalize(
        self,
        name: impl Into<String>,
        entry: &str,
        exit: &str,
    ) -> Result<CompiledRoutine> {
        if self.current_indent != 0 {
            return Err(Error::MalformedProgram {
                message: format!("{} unclosed blocks at finalize", self.current_indent),
            });
        }
        let name = name.into();
        trace!(
            routine = %name,
            statements = self.statements.len(),
            constants = self.consts.len(),
            "finalizing generated program"
        );
        CompiledRoutine::build(name, self.statements, self.consts, entry, exit)
    }
}

fn expect_one(args: &[Value]) -> Result<&Value> {
    args.first().ok_or_else(|| Error::UndefinedVariable {
        name: "<missing argument>".to_string(),
    })
}

fn b64_encode(args: &[Value]) -> Result<Value> {
    let bytes = expect_one(args)?.as_bytes()?;
    Ok(Value::Str(BASE64.encode(bytes)))
}

fn b64_decode(args: &[Value]) -> Result<Value> {
    let text = expect_one(args)?.as_str()?;
    let bytes = BASE64.decode(text).map_err(|e| Error::InvalidBase64 {
        message: e.to_string(),
    })?;
    Ok(Value::Bytes(bytes))
}

fn iso_format(args: &[Value]) -> Result<Value> {
    match expect_one(args)? {
        Value::Timestamp(ts) => Ok(Value::Str(ts.to_rfc3339())),
        other => Err(Error::type_mismatch("timestamp", other.type_name())),
    }
}

fn iso_parse(args: &[Value]) -> Result<Value> {
    let text = expect_one(args)?.as_str()?;
    let ts = DateTime::parse_from_rfc3339(text).map_err(|e| Error::InvalidTimestamp {
        message: e.to_string(),
    })?;
    Ok(Value::Timestamp(ts.with_timezone(&Utc)))
}
