//! Finalized routines: block-tree construction and execution
//!
//! A builder's flat `(indent, statement)` list is grouped here into a
//! well-nested block tree (the same grouping the rendered text implies),
//! then packaged with the constant table as a [`CompiledRoutine`]. Invoking
//! the routine walks the tree over a scope of named values. A build
//! produces the routine once; invocation happens arbitrarily many times.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::runtime::Value;

use super::constants::Constant;
use super::diagnostics::SourceRegistration;
use super::program::{Cond, Expr, Key, Op, Place, Stmt};

/// A node of the block tree
#[derive(Debug, Clone)]
enum Node {
    /// Assignment, placeholder, or comment; `line` indexes the rendered text
    Simple { line: usize, stmt: Stmt },
    /// Indexed iteration with its body
    For {
        line: usize,
        index: String,
        item: String,
        iter: Expr,
        body: Vec<Node>,
    },
    /// Pair iteration with its body
    ForPairs {
        line: usize,
        key: String,
        value: String,
        iter: Expr,
        body: Vec<Node>,
    },
    /// An `if`/`elif` chain; the first arm whose condition holds runs
    Branch { arms: Vec<Arm> },
}

#[derive(Debug, Clone)]
struct Arm {
    line: usize,
    cond: Cond,
    body: Vec<Node>,
}

/// The artifact produced by finalizing a program: a callable taking one
/// input value and returning one output value
///
/// Cheap to clone; clones share the block tree and constant table.
#[derive(Debug, Clone)]
pub struct CompiledRoutine {
    name: String,
    source: Arc<str>,
    lines: Arc<Vec<String>>,
    nodes: Arc<Vec<Node>>,
    consts: Arc<HashMap<String, Constant>>,
    entry: String,
    exit: String,
}

impl CompiledRoutine {
    pub(crate) fn build(
        name: String,
        statements: Vec<(usize, Stmt)>,
        consts: HashMap<String, Constant>,
        entry: &str,
        exit: &str,
    ) -> Result<Self> {
        let lines: Vec<String> = statements
            .iter()
            .map(|(indent, stmt)| format!("{}{}", "    ".repeat(*indent), stmt))
            .collect();
        let source: Arc<str> = Arc::from(lines.join("\n"));

        let mut pos = 0;
        let nodes = parse_block(&statements, &mut pos, 0)?;

        Ok(CompiledRoutine {
            name,
            source,
            lines: Arc::new(lines),
            nodes: Arc::new(nodes),
            consts: Arc::new(consts),
            entry: entry.to_string(),
            exit: exit.to_string(),
        })
    }

    /// The routine's diagnostic name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rendered program text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Execute the program on one input value
    ///
    /// Binds the entry name to `input`, runs the program in an environment
    /// seeded with the constant table, and returns the exit binding. The
    /// rendered source is registered for diagnosis for the duration of the
    /// call and deregistered on every exit path; a failure propagates
    /// wrapped with the failing generated line and the full source.
    pub fn invoke(&self, input: Value) -> Result<Value> {
        let _registration = SourceRegistration::register(&self.name, Arc::clone(&self.source));

        let mut scope: HashMap<String, Value> = HashMap::new();
        scope.insert(self.entry.clone(), input);

        match exec_block(&self.nodes, &mut scope, &self.consts) {
            Ok(()) => scope
                .remove(&self.exit)
                .ok_or_else(|| Error::UndefinedVariable {
                    name: self.exit.clone(),
                }),
            Err((line, cause)) => Err(Error::InGeneratedCode {
                line: self
                    .lines
                    .get(line)
                    .map(|l| l.trim_start().to_string())
                    .unwrap_or_default(),
                source: self.source.to_string(),
                cause: Box::new(cause),
            }),
        }
    }
}

fn malformed(line: usize, message: &str) -> Error {
    Error::MalformedProgram {
        message: format!("{} at statement {}", message, line),
    }
}

/// Group a flat statement slice into the block starting at `indent`
fn parse_block(
    statements: &[(usize, Stmt)],
    pos: &mut usize,
    indent: usize,
) -> Result<Vec<Node>> {
    let mut nodes = Vec::new();

    while *pos < statements.len() {
        let (stmt_indent, stmt) = &statements[*pos];
        if *stmt_indent < indent {
            break;
        }
        if *stmt_indent > indent {
            return Err(malformed(*pos, "unexpected indent"));
        }

        let line = *pos;
        match stmt {
            Stmt::Assign { .. } | Stmt::Literal(Op::Pass) | Stmt::Literal(Op::Comment(_)) => {
                nodes.push(Node::Simple {
                    line,
                    stmt: stmt.clone(),
                });
                *pos += 1;
            }
            Stmt::Literal(Op::For { index, item, iter }) => {
                *pos += 1;
                let body = parse_block(statements, pos, indent + 1)?;
                if body.is_empty() {
                    return Err(malformed(line, "loop header with no body"));
                }
                nodes.push(Node::For {
                    line,
                    index: index.clone(),
                    item: item.clone(),
                    iter: iter.clone(),
                    body,
                });
            }
            Stmt::Literal(Op::ForPairs { key, value, iter }) => {
                *pos += 1;
                let body = parse_block(statements, pos, indent + 1)?;
                if body.is_empty() {
                    return Err(malformed(line, "loop header with no body"));
                }
                nodes.push(Node::ForPairs {
                    line,
                    key: key.clone(),
                    value: value.clone(),
                    iter: iter.clone(),
                    body,
                });
            }
            Stmt::Literal(Op::If { cond }) => {
                *pos += 1;
                let body = parse_block(statements, pos, indent + 1)?;
                if body.is_empty() {
                    return Err(malformed(line, "branch header with no body"));
                }
                let mut arms = vec![Arm {
                    line,
                    cond: cond.clone(),
                    body,
                }];

                while *pos < statements.len() {
                    match &statements[*pos] {
                        (i, Stmt::Literal(Op::Elif { cond })) if *i == indent => {
                            let arm_line = *pos;
                            let cond = cond.clone();
                            *pos += 1;
                            let body = parse_block(statements, pos, indent + 1)?;
                            if body.is_empty() {
                                return Err(malformed(arm_line, "branch header with no body"));
                            }
                            arms.push(Arm {
                                line: arm_line,
                                cond,
                                body,
                            });
                        }
                        _ => break,
                    }
                }

                nodes.push(Node::Branch { arms });
            }
            Stmt::Literal(Op::Elif { .. }) => {
                return Err(malformed(line, "elif without preceding if"));
            }
        }
    }

    Ok(nodes)
}

type Scope = HashMap<String, Value>;
type ExecResult = std::result::Result<(), (usize, Error)>;

fn exec_block(nodes: &[Node], scope: &mut Scope, consts: &HashMap<String, Constant>) -> ExecResult {
    for node in nodes {
        match node {
            Node::Simple { line, stmt } => {
                exec_simple(stmt, scope, consts).map_err(|e| (*line, e))?;
            }
            Node::For {
                line,
                index,
                item,
                iter,
                body,
            } => {
                let items = eval(iter, scope, consts)
                    .and_then(|v| v.as_items().map(|s| s.to_vec()))
                    .map_err(|e| (*line, e))?;
                for (i, element) in items.into_iter().enumerate() {
                    scope.insert(index.clone(), Value::Int(i as i64));
                    scope.insert(item.clone(), element);
                    exec_block(body, scope, consts)?;
                }
            }
            Node::ForPairs {
                line,
                key,
                value,
                iter,
                body,
            } => {
                let pairs = eval(iter, scope, consts)
                    .and_then(|v| value_pairs(&v))
                    .map_err(|e| (*line, e))?;
                for (k, v) in pairs {
                    scope.insert(key.clone(), k);
                    scope.insert(value.clone(), v);
                    exec_block(body, scope, consts)?;
                }
            }
            Node::Branch { arms } => {
                for arm in arms {
                    let hit =
                        eval_cond(&arm.cond, scope, consts).map_err(|e| (arm.line, e))?;
                    if hit {
                        exec_block(&arm.body, scope, consts)?;
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}

fn exec_simple(stmt: &Stmt, scope: &mut Scope, consts: &HashMap<String, Constant>) -> Result<()> {
    let Stmt::Assign { left, right } = stmt else {
        return Ok(()); // pass / comment
    };
    let value = eval(right, scope, consts)?;

    match left {
        Place::Var(name) => {
            scope.insert(name.clone(), value);
            Ok(())
        }
        Place::Index { base, index } => {
            let key = resolve_key(index, scope)?;
            let container = scope
                .get_mut(base)
                .ok_or_else(|| Error::UndefinedVariable { name: base.clone() })?;
            match container {
                Value::Map(_) => container.map_insert(key, value),
                _ => {
                    let idx = as_index(&key)?;
                    container.set_index(idx, value)
                }
            }
        }
    }
}

/// Pairs of a mapping, or of an array of two-element rows (the wire form
/// of a non-string-keyed mapping)
fn value_pairs(value: &Value) -> Result<Vec<(Value, Value)>> {
    match value {
        Value::Map(pairs) => Ok(pairs.clone()),
        Value::Array(rows) | Value::Tuple(rows) => rows
            .iter()
            .map(|row| {
                let items = row.as_items()?;
                if items.len() != 2 {
                    return Err(Error::type_mismatch(
                        "key-value pair",
                        format!("sequence of length {}", items.len()),
                    ));
                }
                Ok((items[0].clone(), items[1].clone()))
            })
            .collect(),
        other => Err(Error::type_mismatch("map", other.type_name())),
    }
}

fn resolve_key(key: &Key, scope: &Scope) -> Result<Value> {
    match key {
        Key::Lit(i) => Ok(Value::Int(*i as i64)),
        Key::Var(name) => scope
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UndefinedVariable { name: name.clone() }),
    }
}

fn as_index(key: &Value) -> Result<usize> {
    let n = key.as_int()?;
    usize::try_from(n).map_err(|_| Error::type_mismatch("non-negative index", n.to_string()))
}

fn eval(expr: &Expr, scope: &Scope, consts: &HashMap<String, Constant>) -> Result<Value> {
    match expr {
        Expr::Var(name) => scope
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UndefinedVariable { name: name.clone() }),
        Expr::Const(name) => match consts.get(name) {
            Some(Constant::Value(v)) => Ok(v.clone()),
            Some(_) => Err(Error::type_mismatch("value constant", name.clone())),
            None => Err(Error::UndefinedConstant { name: name.clone() }),
        },
        Expr::Int(n) => Ok(Value::Int(*n)),
        Expr::Index(base, key) => {
            let container = eval(base, scope, consts)?;
            let key = resolve_key(key, scope)?;
            match container {
                Value::Map(_) => container.map_get(&key),
                _ => container.get_index(as_index(&key)?),
            }
        }
        Expr::Field(base, name) => match eval(base, scope, consts)? {
            Value::Hook(h) => h.get(name),
            other => Err(Error::type_mismatch("hook value", other.type_name())),
        },
        Expr::Tuple(elems) => elems
            .iter()
            .map(|e| eval(e, scope, consts))
            .collect::<Result<Vec<_>>>()
            .map(Value::Tuple),
        Expr::EmptyMap => Ok(Value::Map(Vec::new())),
        Expr::CopyList(inner) => {
            let value = eval(inner, scope, consts)?;
            Ok(Value::Array(value.as_items()?.to_vec()))
        }
        Expr::CopyMap(inner) => {
            let value = eval(inner, scope, consts)?;
            Ok(Value::Map(value.as_map()?.to_vec()))
        }
        Expr::Call(name, args) => {
            let func = match consts.get(name) {
                Some(Constant::Func(f)) => Arc::clone(f),
                Some(_) => return Err(Error::type_mismatch("function constant", name.clone())),
                None => return Err(Error::UndefinedConstant { name: name.clone() }),
            };
            let args = args
                .iter()
                .map(|a| eval(a, scope, consts))
                .collect::<Result<Vec<_>>>()?;
            func(&args)
        }
    }
}

fn eval_cond(cond: &Cond, scope: &Scope, consts: &HashMap<String, Constant>) -> Result<bool> {
    match cond {
        Cond::IsInstance { value, class } => {
            let tag = match consts.get(class) {
                Some(Constant::Class(tag)) => tag.clone(),
                Some(_) => return Err(Error::type_mismatch("class constant", class.clone())),
                None => return Err(Error::UndefinedConstant { name: class.clone() }),
            };
            Ok(eval(value, scope, consts)?.tag() == tag)
        }
        Cond::Eq(left, right) => {
            Ok(eval(left, scope, consts)? == eval(right, scope, consts)?)
        }
    }
}
