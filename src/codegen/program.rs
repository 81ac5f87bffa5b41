//! Statement definitions for generated conversion programs
//!
//! A generated program is an ordered, indented sequence of statements over
//! symbolic variable names. Statements are structured (not raw text) so the
//! finalized routine can interpret them directly, but every statement
//! renders to one line of program text for diagnostics.

use std::fmt;

/// One step of a generated program: a literal operation line, or an
/// assignment binding a left-hand place to a right-hand expression
#[derive(Debug, Clone)]
pub enum Stmt {
    /// Raw operation line (control flow, placeholder, comment)
    Literal(Op),
    /// Bind `left` to the result of `right`
    Assign {
        /// Destination
        left: Place,
        /// Source expression
        right: Expr,
    },
}

/// Literal operation lines
#[derive(Debug, Clone)]
pub enum Op {
    /// Indexed iteration header; the body is the following deeper block.
    /// Binds `index` to the position and `item` to the element.
    For {
        /// Loop index variable
        index: String,
        /// Loop element variable
        item: String,
        /// Sequence to iterate
        iter: Expr,
    },
    /// Pair iteration header over a mapping (or an array of pairs)
    ForPairs {
        /// Key variable
        key: String,
        /// Value variable
        value: String,
        /// Mapping to iterate
        iter: Expr,
    },
    /// Conditional header; the body is the following deeper block
    If {
        /// Branch condition
        cond: Cond,
    },
    /// Chained conditional header; must follow an `If` at the same indent
    Elif {
        /// Branch condition
        cond: Cond,
    },
    /// Placeholder line emitted when closing a block, so no block is empty
    Pass,
    /// Comment line; also the no-op form of an elided self-assignment
    Comment(String),
}

/// Assignment destination
#[derive(Debug, Clone)]
pub enum Place {
    /// A plain variable
    Var(String),
    /// An element of a sequence, or an entry of a mapping
    Index {
        /// Variable holding the container
        base: String,
        /// Element index or entry key
        index: Key,
    },
}

impl Place {
    /// Destination variable shorthand
    pub fn var(name: impl Into<String>) -> Self {
        Place::Var(name.into())
    }

    /// Indexed destination shorthand
    pub fn index(base: impl Into<String>, index: Key) -> Self {
        Place::Index {
            base: base.into(),
            index,
        }
    }
}

/// A subscript: a literal position or a variable holding the index/key
#[derive(Debug, Clone)]
pub enum Key {
    /// Fixed position
    Lit(usize),
    /// Variable whose value is the index (integer) or key (any value)
    Var(String),
}

/// Right-hand-side expressions
#[derive(Debug, Clone)]
pub enum Expr {
    /// Read a variable
    Var(String),
    /// Read a constant-table binding
    Const(String),
    /// Integer literal
    Int(i64),
    /// Subscript a sequence or mapping
    Index(Box<Expr>, Key),
    /// Read a named field of a hook value
    Field(Box<Expr>, String),
    /// Assemble a fixed-size ordered sequence
    Tuple(Vec<Expr>),
    /// A fresh empty mapping
    EmptyMap,
    /// Materialize any sequence as a fresh mutable list
    CopyList(Box<Expr>),
    /// Shallow-copy a mapping
    CopyMap(Box<Expr>),
    /// Invoke a constant-table function
    Call(String, Vec<Expr>),
}

impl Expr {
    /// Variable-read shorthand
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    /// Subscript shorthand
    pub fn index(base: Expr, key: Key) -> Self {
        Expr::Index(Box::new(base), key)
    }

    /// Field-read shorthand
    pub fn field(base: Expr, name: impl Into<String>) -> Self {
        Expr::Field(Box::new(base), name.into())
    }
}

/// Branch conditions
#[derive(Debug, Clone)]
pub enum Cond {
    /// Runtime classification test against a captured class constant
    IsInstance {
        /// Value under test
        value: Expr,
        /// Constant-table name of the class tag
        class: String,
    },
    /// Equality test between two expressions
    Eq(Expr, Expr),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Key::Lit(i) => write!(f, "{}", i),
            Key::Var(name) => write!(f, "{}", name),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) | Expr::Const(name) => write!(f, "{}", name),
            Expr::Int(n) => write!(f, "{}", n),
            Expr::Index(base, key) => write!(f, "{}[{}]", base, key),
            Expr::Field(base, name) => write!(f, "{}.{}", base, name),
            Expr::Tuple(elems) => {
                write!(f, "(")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, ")")
            }
            Expr::EmptyMap => write!(f, "{{}}"),
            Expr::CopyList(inner) => write!(f, "list({})", inner),
            Expr::CopyMap(inner) => write!(f, "{}.copy()", inner),
            Expr::Call(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cond::IsInstance { value, class } => {
                write!(f, "isinstance({}, {})", value, class)
            }
            Cond::Eq(left, right) => write!(f, "{} == {}", left, right),
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Place::Var(name) => write!(f, "{}", name),
            Place::Index { base, index } => write!(f, "{}[{}]", base, index),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Op::For { index, item, iter } => {
                write!(f, "for {}, {} in enumerate({}):", index, item, iter)
            }
            Op::ForPairs { key, value, iter } => {
                write!(f, "for {}, {} in {}.items():", key, value, iter)
            }
            Op::If { cond } => write!(f, "if {}:", cond),
            Op::Elif { cond } => write!(f, "elif {}:", cond),
            Op::Pass => write!(f, "pass"),
            Op::Comment(text) => write!(f, "# {}", text),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Stmt::Literal(op) => write!(f, "{}", op),
            Stmt::Assign { left, right } => write!(f, "{} = {}", left, right),
        }
    }
}
