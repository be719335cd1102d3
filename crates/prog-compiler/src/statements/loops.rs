//! `while`, `for` and `foreach` loops.

use prog_types::{Container, TypeDescriptor};

use super::{StatementCompiler, StatementKindTag};
use crate::ast::{Statement, StatementKind};
use crate::compiler::{Closer, Compiler, SourceLine};
use crate::error::Result;
use crate::lexer::Token;
use crate::space::VariableSpace;

pub(super) const WHILE: StatementCompiler = StatementCompiler {
    tag: StatementKindTag::While,
    priority: 70,
    matches: |line| matches!(line.token(0), Some(Token::While)),
    compile: compile_while,
};

pub(super) const FOR: StatementCompiler = StatementCompiler {
    tag: StatementKindTag::For,
    priority: 70,
    matches: |line| matches!(line.token(0), Some(Token::For)),
    compile: compile_for,
};

pub(super) const FOREACH: StatementCompiler = StatementCompiler {
    tag: StatementKindTag::Foreach,
    priority: 70,
    matches: |line| matches!(line.token(0), Some(Token::Foreach)),
    compile: compile_foreach,
};

fn compile_while(c: &mut Compiler<'_>, space: &mut VariableSpace, index: usize) -> Result<(Statement, usize)> {
    let line = c.line(index);
    let number = line.number;
    let condition = c.typed_expression(
        space,
        index,
        1..line.tokens.len(),
        TypeDescriptor::BOOLEAN,
        "loop condition",
    )?;
    let (body, end) = c.compile_loop_body(space, index, Closer::EndWhile)?;
    Ok((
        Statement {
            line: number,
            kind: StatementKind::While { condition, body },
        },
        end + 1,
    ))
}

/// The loop variable name in `<keyword> <name> ...`.
fn loop_variable(line: &SourceLine) -> Result<String> {
    match line.token(1) {
        Some(Token::Ident(name)) => Ok(name.clone()),
        _ => Err(line.error(format!("expected a loop variable after '{}'", line.tokens[0].0))),
    }
}

/// A copy of `space` with the loop variable declared in it.
fn body_space(
    line: &SourceLine,
    space: &VariableSpace,
    name: &str,
    ty: TypeDescriptor,
    read_only: bool,
) -> Result<VariableSpace> {
    let mut inner = space.clone();
    let declared = if read_only {
        inner.declare_read_only(name, ty)
    } else {
        inner.declare(name, ty)
    };
    declared.map_err(|message| line.error(message))?;
    Ok(inner)
}

fn compile_for(c: &mut Compiler<'_>, space: &mut VariableSpace, index: usize) -> Result<(Statement, usize)> {
    let line = c.line(index);
    let number = line.number;
    let variable = loop_variable(line)?;
    if !matches!(line.token(2), Some(Token::Eq)) {
        return Err(line.error("expected '=' after the loop variable"));
    }
    let to_at = line
        .find(&Token::To, 3)
        .ok_or_else(|| line.error("expected 'to' in for loop"))?;

    let from = c.typed_expression(space, index, 3..to_at, TypeDescriptor::NUMBER, "loop start")?;
    let to = c.typed_expression(
        space,
        index,
        to_at + 1..line.tokens.len(),
        TypeDescriptor::NUMBER,
        "loop end",
    )?;
    // The counter is owned by the loop.
    let inner = body_space(line, space, &variable, TypeDescriptor::NUMBER, true)?;

    let (body, end) = c.compile_loop_body(&inner, index, Closer::EndFor)?;
    Ok((
        Statement {
            line: number,
            kind: StatementKind::For {
                variable: variable.to_ascii_lowercase(),
                from,
                to,
                body,
            },
        },
        end + 1,
    ))
}

fn compile_foreach(c: &mut Compiler<'_>, space: &mut VariableSpace, index: usize) -> Result<(Statement, usize)> {
    let line = c.line(index);
    let number = line.number;
    let variable = loop_variable(line)?;
    if !matches!(line.token(2), Some(Token::In)) {
        return Err(line.error("expected 'in' after the loop variable"));
    }

    let collection = c.expression(space, index, 3..line.tokens.len())?;
    if collection.ty.container() != Container::Sequence {
        return Err(line.error(format!(
            "foreach needs a sequence, found {}",
            collection.ty.without_literal()
        )));
    }
    let inner = body_space(line, space, &variable, collection.ty.element(), false)?;

    let (body, end) = c.compile_loop_body(&inner, index, Closer::EndForeach)?;
    Ok((
        Statement {
            line: number,
            kind: StatementKind::Foreach {
                variable: variable.to_ascii_lowercase(),
                collection,
                body,
            },
        },
        end + 1,
    ))
}
