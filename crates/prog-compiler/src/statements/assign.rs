//! `<name> = <expr>`

use super::{StatementCompiler, StatementKindTag};
use crate::ast::{Statement, StatementKind};
use crate::compiler::{Compiler, SourceLine};
use crate::error::Result;
use crate::lexer::Token;
use crate::space::VariableSpace;

pub(super) const COMPILER: StatementCompiler = StatementCompiler {
    tag: StatementKindTag::Assign,
    priority: 10,
    matches,
    compile,
};

fn matches(line: &SourceLine) -> bool {
    matches!(
        (line.token(0), line.token(1)),
        (Some(Token::Ident(_)), Some(Token::Eq))
    )
}

fn compile(c: &mut Compiler<'_>, space: &mut VariableSpace, index: usize) -> Result<(Statement, usize)> {
    let line = c.line(index);
    let name = match line.token(0) {
        Some(Token::Ident(name)) => name.clone(),
        _ => return Err(line.error("expected a variable name")),
    };
    let ty = space
        .get(&name)
        .ok_or_else(|| line.error(format!("unknown variable '{}'", name)))?;
    if space.is_read_only(&name) {
        return Err(line.error(format!("cannot assign to loop variable '{}'", name)));
    }

    let what = format!("value assigned to '{}'", name);
    let value = c.typed_expression(space, index, 2..line.tokens.len(), ty, &what)?;

    Ok((
        Statement {
            line: line.number,
            kind: StatementKind::Assign {
                name: name.to_ascii_lowercase(),
                value,
            },
        },
        index + 1,
    ))
}
