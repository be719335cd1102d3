//! Expression parsing and typing.
//!
//! Expressions are parsed and type-checked in a single pass: every node is
//! produced with its descriptor, and calls are bound through the compile
//! environment's catalogs as soon as they are read.

mod atoms;
mod pratt;

use prog_types::TypeDescriptor;

use crate::ast::Expr;
use crate::catalog::CompileEnv;
use crate::error::CompileError;
use crate::lexer::Spanned;
use crate::space::VariableSpace;
use crate::stream::TokenStream;

/// Recursive-descent expression parser bound to one line.
pub(crate) struct ExprParser<'a> {
    pub(crate) stream: TokenStream<'a>,
    pub(crate) space: &'a VariableSpace,
    pub(crate) env: &'a CompileEnv<'a>,
}

impl<'a> ExprParser<'a> {
    pub(crate) fn error(&self, message: impl Into<String>) -> CompileError {
        self.stream.error(message)
    }
}

/// Parse `tokens` (a slice of one line) as a single complete expression.
pub(crate) fn parse_expression(
    tokens: &[Spanned],
    source: &str,
    line: usize,
    space: &VariableSpace,
    env: &CompileEnv<'_>,
) -> Result<Expr, CompileError> {
    if tokens.is_empty() {
        return Err(CompileError::new(line, "expected an expression"));
    }
    let mut parser = ExprParser {
        stream: TokenStream::new(tokens, source, line),
        space,
        env,
    };
    let expr = pratt::parse_pratt(&mut parser, 0)?;
    if let Some(token) = parser.stream.peek() {
        return Err(parser.error(format!("unexpected '{}' after expression", token)));
    }
    Ok(expr)
}

/// Parse an expression and require it to be usable where `expected` is declared.
pub(crate) fn parse_typed(
    tokens: &[Spanned],
    source: &str,
    line: usize,
    space: &VariableSpace,
    env: &CompileEnv<'_>,
    expected: TypeDescriptor,
    what: &str,
) -> Result<Expr, CompileError> {
    let expr = parse_expression(tokens, source, line, space, env)?;
    if !expr.ty.compatible_with(&expected) {
        return Err(CompileError::new(
            line,
            format!("{} must be {}, found {}", what, expected, expr.ty.without_literal()),
        ));
    }
    Ok(expr)
}
