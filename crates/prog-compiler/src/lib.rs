//! Prog compiler
//!
//! Turns line-oriented prog source into a typed statement tree:
//!
//! ```text
//! source -> lexer (per line) -> statement registry -> Vec<Statement>
//!                                   |
//!                              expr (Pratt) -> FunctionCatalog / ProgCatalog
//! ```
//!
//! Compilation is pure. Everything outside the source text (functions, other
//! progs, register properties) is reached through the traits in [`catalog`].

pub mod ast;
pub mod catalog;
pub mod compiler;
pub mod error;
mod expr;
pub mod lexer;
pub mod space;
pub mod statements;
pub mod stream;

pub use ast::{
    BinaryOp, Branch, Expr, ExprKind, Parameter, Statement, StatementKind, StatementResult, UnaryOp,
    block_result,
};
pub use catalog::{
    ArgInfo, CompileEnv, FunctionBinding, FunctionCatalog, FunctionId, ProgCatalog, ProgId,
    ProgSignature, RegisterSchema,
};
pub use compiler::{RETURN_SLOT, compile};
pub use error::CompileError;
pub use statements::{StatementKindTag, statement_kinds};
