use super::{StatementCompiler, StatementKindTag};
use crate::ast::{Statement, StatementKind};
use crate::compiler::{Compiler, SourceLine};
use crate::error::Result;
use crate::space::VariableSpace;

pub(super) const COMPILER: StatementCompiler = StatementCompiler {
    tag: StatementKindTag::Comment,
    priority: 100,
    matches,
    compile,
};

fn matches(line: &SourceLine) -> bool {
    line.is_comment()
}

fn compile(c: &mut Compiler<'_>, _: &mut VariableSpace, index: usize) -> Result<(Statement, usize)> {
    let line = c.line(index);
    let text = line.text.trim_start_matches('/').trim().to_string();
    Ok((
        Statement {
            line: line.number,
            kind: StatementKind::Comment(text),
        },
        index + 1,
    ))
}
