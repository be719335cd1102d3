//! `return`, `break` and `continue`.

use super::{StatementCompiler, StatementKindTag};
use crate::ast::{Statement, StatementKind};
use crate::compiler::Compiler;
use crate::error::Result;
use crate::lexer::Token;
use crate::space::VariableSpace;

pub(super) const RETURN: StatementCompiler = StatementCompiler {
    tag: StatementKindTag::Return,
    priority: 60,
    matches: |line| matches!(line.token(0), Some(Token::Return)),
    compile: compile_return,
};

pub(super) const BREAK: StatementCompiler = StatementCompiler {
    tag: StatementKindTag::Break,
    priority: 60,
    matches: |line| matches!(line.token(0), Some(Token::Break)),
    compile: compile_break,
};

pub(super) const CONTINUE: StatementCompiler = StatementCompiler {
    tag: StatementKindTag::Continue,
    priority: 60,
    matches: |line| matches!(line.token(0), Some(Token::Continue)),
    compile: compile_continue,
};

fn compile_return(c: &mut Compiler<'_>, space: &mut VariableSpace, index: usize) -> Result<(Statement, usize)> {
    let line = c.line(index);
    let return_type = c.return_type();
    let has_value = line.tokens.len() > 1;

    let value = match (return_type.is_void(), has_value) {
        (true, false) => None,
        (true, true) => return Err(line.error("this prog returns void and cannot return a value")),
        (false, false) => {
            return Err(line.error(format!("return needs a value of type {}", return_type)));
        }
        (false, true) => Some(c.typed_expression(
            space,
            index,
            1..line.tokens.len(),
            return_type,
            "return value",
        )?),
    };

    Ok((
        Statement {
            line: line.number,
            kind: StatementKind::Return(value),
        },
        index + 1,
    ))
}

fn loop_control(c: &Compiler<'_>, index: usize, kind: StatementKind, word: &str) -> Result<(Statement, usize)> {
    let line = c.line(index);
    if line.tokens.len() > 1 {
        return Err(line.error(format!("unexpected text after '{}'", word)));
    }
    if !c.in_loop() {
        return Err(line.error(format!("'{}' outside of a loop", word)));
    }
    Ok((
        Statement {
            line: line.number,
            kind,
        },
        index + 1,
    ))
}

fn compile_break(c: &mut Compiler<'_>, _: &mut VariableSpace, index: usize) -> Result<(Statement, usize)> {
    loop_control(c, index, StatementKind::Break, "break")
}

fn compile_continue(c: &mut Compiler<'_>, _: &mut VariableSpace, index: usize) -> Result<(Statement, usize)> {
    loop_control(c, index, StatementKind::Continue, "continue")
}

#[cfg(test)]
mod tests {
    use prog_types::TypeDescriptor;

    use crate::catalog::CompileEnv;
    use crate::compile;

    #[test]
    fn test_return_value_rules() {
        let env = CompileEnv::empty();
        assert!(compile("return", &[], TypeDescriptor::VOID, &env).is_ok());
        assert!(compile("return 1", &[], TypeDescriptor::VOID, &env).is_err());
        assert!(compile("return", &[], TypeDescriptor::NUMBER, &env).is_err());
        assert!(compile("return \"x\"", &[], TypeDescriptor::NUMBER, &env).is_err());
    }

    #[test]
    fn test_continue_at_top_level() {
        let err = compile("// start\ncontinue", &[], TypeDescriptor::VOID, &CompileEnv::empty()).unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("outside of a loop"));
    }

    #[test]
    fn test_break_inside_if_outside_loop() {
        let err = compile("if true\nbreak\nend if", &[], TypeDescriptor::VOID, &CompileEnv::empty()).unwrap_err();
        assert_eq!(err.line, 2);
    }
}
