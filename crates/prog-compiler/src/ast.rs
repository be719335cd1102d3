//! Compiled statement tree
//!
//! The compiler produces fully typed nodes: every [`Expr`] knows its
//! [`TypeDescriptor`], and calls are already bound to a function or prog
//! identity. Statements own their operands and nested blocks; nothing points
//! back at the prog that contains them.

use prog_types::{TypeDescriptor, Value};

use crate::catalog::{FunctionId, ProgId};

/// Binary operator after type resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Numeric or time addition
    Add,
    /// Text concatenation (`+` with a text operand)
    Concat,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// A typed expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: TypeDescriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A constant, including typed nulls.
    Literal(Value),
    /// A variable reference (name already folded to lower case).
    Variable(String),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// A call to a built-in function.
    Call {
        function: FunctionId,
        name: String,
        args: Vec<Expr>,
    },
    /// A call to another prog (or the same one).
    ProgCall {
        prog: ProgId,
        name: String,
        args: Vec<Expr>,
    },
    /// `target[index]` over a sequence, mapping or multi-mapping.
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, ty: TypeDescriptor) -> Self {
        Self { kind, ty }
    }

    /// Literal text, if this expression is a text constant.
    pub fn literal_text(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Literal(value) if self.ty.is_literal() => value.as_text(),
            _ => None,
        }
    }
}

/// Control-flow signal a statement can yield.
///
/// At compile time this is the statement's *expected* result, used to check
/// nesting and return paths; at run time the interpreter produces the
/// non-error variants and reports `Error` through a fault instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementResult {
    Normal,
    Continue,
    Break,
    Return,
    Error,
}

/// A declared prog parameter.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Parameter {
    pub ty: TypeDescriptor,
    pub name: String,
}

impl Parameter {
    pub fn new(ty: TypeDescriptor, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

/// One arm of a conditional or switch: a test and the block it guards.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub test: Expr,
    pub body: Vec<Statement>,
}

/// A compiled statement with its 1-based source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub line: usize,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// `var name as type [= init]`
    Declare {
        name: String,
        ty: TypeDescriptor,
        init: Option<Expr>,
    },
    /// `name = value`
    Assign { name: String, value: Expr },
    /// `if` / `elseif` / `else`
    Conditional {
        branches: Vec<Branch>,
        otherwise: Option<Vec<Statement>>,
    },
    While {
        condition: Expr,
        body: Vec<Statement>,
    },
    /// `for name = from to to`, inclusive, step 1
    For {
        variable: String,
        from: Expr,
        to: Expr,
        body: Vec<Statement>,
    },
    Foreach {
        variable: String,
        collection: Expr,
        body: Vec<Statement>,
    },
    Switch {
        subject: Expr,
        cases: Vec<Branch>,
        default: Option<Vec<Statement>>,
    },
    /// A function or prog call whose result is discarded.
    Call(Expr),
    Return(Option<Expr>),
    Break,
    Continue,
    Comment(String),
}

impl Statement {
    /// The control signal this statement is statically known to produce.
    pub fn expected_result(&self) -> StatementResult {
        match &self.kind {
            StatementKind::Return(_) => StatementResult::Return,
            StatementKind::Break => StatementResult::Break,
            StatementKind::Continue => StatementResult::Continue,
            StatementKind::Conditional {
                branches,
                otherwise: Some(otherwise),
            } => {
                let all_return = branches
                    .iter()
                    .all(|b| block_result(&b.body) == StatementResult::Return)
                    && block_result(otherwise) == StatementResult::Return;
                if all_return {
                    StatementResult::Return
                } else {
                    StatementResult::Normal
                }
            }
            StatementKind::Switch {
                cases,
                default: Some(default),
                ..
            } => {
                let all_return = cases
                    .iter()
                    .all(|c| block_result(&c.body) == StatementResult::Return)
                    && block_result(default) == StatementResult::Return;
                if all_return {
                    StatementResult::Return
                } else {
                    StatementResult::Normal
                }
            }
            _ => StatementResult::Normal,
        }
    }
}

/// Expected result of a block: that of its last non-comment statement.
pub fn block_result(statements: &[Statement]) -> StatementResult {
    statements
        .iter()
        .rev()
        .find(|s| !matches!(s.kind, StatementKind::Comment(_)))
        .map(Statement::expected_result)
        .unwrap_or(StatementResult::Normal)
}
