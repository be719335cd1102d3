//! `switch` / `case` / `default` / `end switch`
//!
//! Cases are tested in order against the subject; the first equal one runs
//! and there is no fall-through. `default` must be the last arm.

use super::{StatementCompiler, StatementKindTag};
use crate::ast::{Branch, Statement, StatementKind};
use crate::compiler::{Closer, Compiler, SourceLine, closer_of};
use crate::error::{CompileError, Result};
use crate::lexer::Token;
use crate::space::VariableSpace;

pub(super) const COMPILER: StatementCompiler = StatementCompiler {
    tag: StatementKindTag::Switch,
    priority: 70,
    matches,
    compile,
};

fn matches(line: &SourceLine) -> bool {
    matches!(line.token(0), Some(Token::Switch))
}

const ARMS: [Closer; 3] = [Closer::Case, Closer::Default, Closer::EndSwitch];

fn compile(c: &mut Compiler<'_>, space: &mut VariableSpace, index: usize) -> Result<(Statement, usize)> {
    let number = c.line(index).number;
    let subject = c.expression(space, index, 1..c.line(index).tokens.len())?;
    if subject.ty.is_void() {
        return Err(c.line(index).error("cannot switch on a void call"));
    }

    // Only comments may sit between `switch` and its first arm.
    let (body, mut at, mut closer) = c.compile_block(space, index, index + 1, &ARMS)?;
    if let Some(stray) = body.iter().find(|s| !matches!(s.kind, StatementKind::Comment(_))) {
        return Err(CompileError::new(stray.line, "expected 'case' or 'default' after 'switch'"));
    }

    let mut cases = Vec::new();
    let mut default = None;
    loop {
        match closer {
            Closer::Case => {
                let line = c.line(at);
                let test = c.expression(space, at, 1..line.tokens.len())?;
                if !(test.ty.compatible_with(&subject.ty) || subject.ty.compatible_with(&test.ty)) {
                    return Err(line.error(format!(
                        "case value {} cannot match a {} subject",
                        test.ty.without_literal(),
                        subject.ty.without_literal()
                    )));
                }
                let (body, next_at, next) = c.compile_block(space, index, at + 1, &ARMS)?;
                cases.push(Branch { test, body });
                at = next_at;
                closer = next;
            }
            Closer::Default => {
                let (body, next_at, _) = c.compile_block(space, index, at + 1, &[Closer::EndSwitch])?;
                default = Some(body);
                at = next_at;
                break;
            }
            _ => break,
        }
    }
    debug_assert_eq!(closer_of(c.line(at)), Some(Closer::EndSwitch));

    Ok((
        Statement {
            line: number,
            kind: StatementKind::Switch {
                subject,
                cases,
                default,
            },
        },
        at + 1,
    ))
}
