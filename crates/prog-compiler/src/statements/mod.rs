//! Statement compilers
//!
//! Each statement kind contributes one [`StatementCompiler`]: a line matcher
//! and a compile function. The table is closed and explicit; it is sorted
//! by priority once, on first use. A line no matcher accepts is compiled as
//! a bare call by [`call::compile`].

mod assign;
pub(crate) mod call;
mod comment;
mod conditional;
mod declare;
mod flow;
mod loops;
mod switch;

use std::sync::OnceLock;

use crate::ast::Statement;
use crate::compiler::{Compiler, SourceLine};
use crate::error::Result;
use crate::space::VariableSpace;

/// Statement kinds with a line matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKindTag {
    Comment,
    Declare,
    Conditional,
    While,
    For,
    Foreach,
    Switch,
    Return,
    Break,
    Continue,
    Assign,
}

pub(crate) type CompileFn = fn(&mut Compiler<'_>, &mut VariableSpace, usize) -> Result<(Statement, usize)>;

/// Matcher and compiler for one statement kind.
pub(crate) struct StatementCompiler {
    pub tag: StatementKindTag,
    /// Higher priorities are tried first.
    pub priority: u8,
    pub matches: fn(&SourceLine) -> bool,
    pub compile: CompileFn,
}

fn entries() -> Vec<StatementCompiler> {
    vec![
        comment::COMPILER,
        declare::COMPILER,
        conditional::COMPILER,
        loops::WHILE,
        loops::FOR,
        loops::FOREACH,
        switch::COMPILER,
        flow::RETURN,
        flow::BREAK,
        flow::CONTINUE,
        assign::COMPILER,
    ]
}

/// The statement table, highest priority first.
pub(crate) fn registry() -> &'static [StatementCompiler] {
    static REGISTRY: OnceLock<Vec<StatementCompiler>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut table = entries();
        table.sort_by(|a, b| b.priority.cmp(&a.priority));
        table
    })
}

/// Statement kinds in the order their matchers are tried.
pub fn statement_kinds() -> Vec<StatementKindTag> {
    registry().iter().map(|entry| entry.tag).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_priority_ordered() {
        let table = registry();
        assert!(table.windows(2).all(|w| w[0].priority >= w[1].priority));
        assert_eq!(table[0].tag, StatementKindTag::Comment);
        assert_eq!(table.last().map(|e| e.tag), Some(StatementKindTag::Assign));
    }

    #[test]
    fn test_every_kind_registered_once() {
        let kinds = statement_kinds();
        assert_eq!(kinds.len(), 11);
        for (i, kind) in kinds.iter().enumerate() {
            assert!(!kinds[i + 1..].contains(kind));
        }
    }
}
