//! `if` / `elseif` (or `else if`) / `else` / `end if`

use prog_types::TypeDescriptor;

use super::{StatementCompiler, StatementKindTag};
use crate::ast::{Branch, Expr, Statement, StatementKind};
use crate::compiler::{Closer, Compiler, SourceLine};
use crate::error::Result;
use crate::lexer::Token;
use crate::space::VariableSpace;

pub(super) const COMPILER: StatementCompiler = StatementCompiler {
    tag: StatementKindTag::Conditional,
    priority: 80,
    matches,
    compile,
};

fn matches(line: &SourceLine) -> bool {
    matches!(line.token(0), Some(Token::If))
}

/// The boolean test on line `index`, skipping the leading keyword(s).
fn condition(c: &Compiler<'_>, space: &VariableSpace, index: usize) -> Result<Expr> {
    let line = c.line(index);
    let skip = match (line.token(0), line.token(1)) {
        (Some(Token::Else), Some(Token::If)) => 2,
        _ => 1,
    };
    c.typed_expression(space, index, skip..line.tokens.len(), TypeDescriptor::BOOLEAN, "condition")
}

fn compile(c: &mut Compiler<'_>, space: &mut VariableSpace, index: usize) -> Result<(Statement, usize)> {
    let number = c.line(index).number;
    let mut branches = Vec::new();
    let mut test = condition(c, space, index)?;
    let mut next = index + 1;

    let (otherwise, end) = loop {
        let (body, at, closer) =
            c.compile_block(space, index, next, &[Closer::ElseIf, Closer::Else, Closer::EndIf])?;
        branches.push(Branch { test, body });
        match closer {
            Closer::ElseIf => {
                test = condition(c, space, at)?;
                next = at + 1;
            }
            Closer::Else => {
                let (body, end, _) = c.compile_block(space, index, at + 1, &[Closer::EndIf])?;
                break (Some(body), end);
            }
            _ => break (None, at),
        }
    };

    Ok((
        Statement {
            line: number,
            kind: StatementKind::Conditional { branches, otherwise },
        },
        end + 1,
    ))
}
