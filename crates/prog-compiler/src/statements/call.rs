//! Bare calls: `name(args)` or `@prog(args)` with the result discarded.

use crate::ast::{ExprKind, Statement, StatementKind};
use crate::compiler::Compiler;
use crate::error::Result;
use crate::space::VariableSpace;

pub(crate) fn compile(c: &mut Compiler<'_>, space: &mut VariableSpace, index: usize) -> Result<(Statement, usize)> {
    let line = c.line(index);
    let expr = c.expression(space, index, 0..line.tokens.len())?;
    if !matches!(expr.kind, ExprKind::Call { .. } | ExprKind::ProgCall { .. }) {
        return Err(line.error(format!("'{}' is not a statement", line.text)));
    }
    Ok((
        Statement {
            line: line.number,
            kind: StatementKind::Call(expr),
        },
        index + 1,
    ))
}
