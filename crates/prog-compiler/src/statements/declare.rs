//! `var <name> as <type> [= <expr>]`

use prog_types::TypeDescriptor;

use super::{StatementCompiler, StatementKindTag};
use crate::ast::{Statement, StatementKind};
use crate::compiler::{Compiler, SourceLine};
use crate::error::Result;
use crate::lexer::Token;
use crate::space::VariableSpace;

pub(super) const COMPILER: StatementCompiler = StatementCompiler {
    tag: StatementKindTag::Declare,
    priority: 90,
    matches,
    compile,
};

fn matches(line: &SourceLine) -> bool {
    matches!(line.token(0), Some(Token::Var))
}

fn compile(c: &mut Compiler<'_>, space: &mut VariableSpace, index: usize) -> Result<(Statement, usize)> {
    let line = c.line(index);
    let number = line.number;

    let name = match line.token(1) {
        Some(Token::Ident(name)) => name.clone(),
        Some(other) => return Err(line.error(format!("expected a variable name, found '{}'", other))),
        None => return Err(line.error("expected a variable name after 'var'")),
    };
    if !matches!(line.token(2), Some(Token::As)) {
        return Err(line.error(format!("expected 'as <type>' after '{}'", name)));
    }

    let assign_at = line.find(&Token::Eq, 3);
    let type_end = assign_at.unwrap_or(line.tokens.len());
    let ty = TypeDescriptor::parse(line.text_of(3..type_end))
        .map_err(|err| line.error(err.to_string()))?;
    if ty.is_void() {
        return Err(line.error(format!("variable '{}' cannot be void", name)));
    }
    let ty = ty.without_literal();

    let init = match assign_at {
        Some(at) => {
            let end = line.tokens.len();
            let what = format!("initial value of '{}'", name);
            Some(c.typed_expression(space, index, at + 1..end, ty, &what)?)
        }
        None => None,
    };

    space
        .declare(&name, ty)
        .map_err(|message| crate::CompileError::new(number, message))?;

    Ok((
        Statement {
            line: number,
            kind: StatementKind::Declare {
                name: name.to_ascii_lowercase(),
                ty,
                init,
            },
        },
        index + 1,
    ))
}
