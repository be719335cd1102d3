//! Line-oriented prog compiler
//!
//! Source is split into lines and lexed up front. The [`Compiler`] then walks
//! the lines, handing each one to the first statement compiler in the
//! registry whose matcher accepts it (see [`crate::statements`]). Block
//! statements compile their bodies recursively and consume the closing line.
//!
//! # Return paths
//!
//! For a non-void prog the *last* top-level statement must be statically
//! return-yielding (see [`block_result`]). This is deliberately shallow: an
//! `if` without `else` never counts, whatever its branches contain.

use std::fmt;
use std::ops::Range;

use tracing::debug;

use prog_types::TypeDescriptor;

use crate::ast::{Expr, Parameter, Statement, StatementResult, block_result};
use crate::catalog::CompileEnv;
use crate::error::{CompileError, Result};
use crate::expr;
use crate::lexer::{Spanned, Token, tokenize};
use crate::space::VariableSpace;
use crate::statements;
use crate::stream::TokenStream;

/// Name of the implicit slot holding a prog's return value.
pub const RETURN_SLOT: &str = "return";

/// One non-blank source line with its original 1-based line number.
#[derive(Debug, Clone)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
    pub tokens: Vec<Spanned>,
}

impl SourceLine {
    /// Whether the line holds nothing but a comment.
    pub fn is_comment(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index).map(|(token, _)| token)
    }

    /// Index of the first `wanted` token at or after `from`.
    pub fn find(&self, wanted: &Token, from: usize) -> Option<usize> {
        self.tokens
            .iter()
            .skip(from)
            .position(|(token, _)| token == wanted)
            .map(|offset| offset + from)
    }

    /// Raw text covered by the tokens in `range`.
    pub fn text_of(&self, range: Range<usize>) -> &str {
        TokenStream::new(&self.tokens, &self.text, self.number).text_between(range.start, range.end)
    }

    pub fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::new(self.number, message)
    }
}

/// Lines that close (or continue) an enclosing block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closer {
    EndIf,
    ElseIf,
    Else,
    EndWhile,
    EndFor,
    EndForeach,
    Case,
    Default,
    EndSwitch,
}

impl fmt::Display for Closer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Closer::EndIf => "end if",
            Closer::ElseIf => "elseif",
            Closer::Else => "else",
            Closer::EndWhile => "end while",
            Closer::EndFor => "end for",
            Closer::EndForeach => "end foreach",
            Closer::Case => "case",
            Closer::Default => "default",
            Closer::EndSwitch => "end switch",
        })
    }
}

/// Classify a line as a block closer, if it is one.
pub fn closer_of(line: &SourceLine) -> Option<Closer> {
    let first = line.token(0)?;
    let second = line.token(1);
    let len = line.tokens.len();
    match (first, second) {
        (Token::End, Some(Token::If)) if len == 2 => Some(Closer::EndIf),
        (Token::End, Some(Token::While)) if len == 2 => Some(Closer::EndWhile),
        (Token::End, Some(Token::For)) if len == 2 => Some(Closer::EndFor),
        (Token::End, Some(Token::Foreach)) if len == 2 => Some(Closer::EndForeach),
        (Token::End, Some(Token::Switch)) if len == 2 => Some(Closer::EndSwitch),
        (Token::ElseIf, Some(_)) => Some(Closer::ElseIf),
        (Token::Else, Some(Token::If)) if len > 2 => Some(Closer::ElseIf),
        (Token::Else, None) => Some(Closer::Else),
        (Token::Case, Some(_)) => Some(Closer::Case),
        (Token::Default, None) => Some(Closer::Default),
        _ => None,
    }
}

/// Compilation state shared by every statement compiler.
pub struct Compiler<'a> {
    lines: Vec<SourceLine>,
    env: &'a CompileEnv<'a>,
    return_type: TypeDescriptor,
    loop_depth: usize,
}

impl<'a> Compiler<'a> {
    pub fn line(&self, index: usize) -> &SourceLine {
        &self.lines[index]
    }

    pub fn return_type(&self) -> TypeDescriptor {
        self.return_type
    }

    pub fn in_loop(&self) -> bool {
        self.loop_depth > 0
    }

    /// Compile the statement starting at `index`.
    ///
    /// Returns the statement and the index of the first line after it.
    pub fn compile_statement(&mut self, space: &mut VariableSpace, index: usize) -> Result<(Statement, usize)> {
        let line = &self.lines[index];
        if let Some(closer) = closer_of(line) {
            return Err(line.error(format!("unexpected '{}'", closer)));
        }
        let compile = statements::registry()
            .iter()
            .find(|entry| (entry.matches)(line))
            .map(|entry| entry.compile);
        match compile {
            Some(compile) => compile(self, space, index),
            None => statements::call::compile(self, space, index),
        }
    }

    /// Compile a nested block starting at `start` until one of `closers`.
    ///
    /// The block sees a copy of `space`; its own declarations are dropped
    /// when it closes. Returns the body, the index of the closing line and
    /// which closer ended the block. An unclosed block is reported on line
    /// `opener`, the statement that began it.
    pub fn compile_block(
        &mut self,
        space: &VariableSpace,
        opener: usize,
        start: usize,
        closers: &[Closer],
    ) -> Result<(Vec<Statement>, usize, Closer)> {
        let mut inner = space.clone();
        let mut body = Vec::new();
        let mut index = start;
        while index < self.lines.len() {
            if let Some(closer) = closer_of(&self.lines[index]) {
                if closers.contains(&closer) {
                    return Ok((body, index, closer));
                }
            }
            let (statement, next) = self.compile_statement(&mut inner, index)?;
            body.push(statement);
            index = next;
        }

        let expected = closers.last().copied().unwrap_or(Closer::EndIf);
        Err(CompileError::new(
            self.lines[opener].number,
            format!("block is never closed (expected '{}')", expected),
        ))
    }

    /// Compile the body of the loop opened on line `opener`, tracking
    /// nesting so `break`/`continue` resolve.
    pub fn compile_loop_body(
        &mut self,
        space: &VariableSpace,
        opener: usize,
        closer: Closer,
    ) -> Result<(Vec<Statement>, usize)> {
        self.loop_depth += 1;
        let result = self.compile_block(space, opener, opener + 1, &[closer]);
        self.loop_depth -= 1;
        let (body, end, _) = result?;
        Ok((body, end))
    }

    /// Parse the tokens in `tokens` of line `index` as an expression.
    pub fn expression(&self, space: &VariableSpace, index: usize, tokens: Range<usize>) -> Result<Expr> {
        let line = &self.lines[index];
        let slice = line.tokens.get(tokens).unwrap_or(&[]);
        expr::parse_expression(slice, &line.text, line.number, space, self.env)
    }

    /// Like [`Compiler::expression`], requiring compatibility with `expected`.
    pub fn typed_expression(
        &self,
        space: &VariableSpace,
        index: usize,
        tokens: Range<usize>,
        expected: TypeDescriptor,
        what: &str,
    ) -> Result<Expr> {
        let line = &self.lines[index];
        let slice = line.tokens.get(tokens).unwrap_or(&[]);
        expr::parse_typed(slice, &line.text, line.number, space, self.env, expected, what)
    }
}

fn split_lines(source: &str) -> Result<Vec<SourceLine>> {
    let mut lines = Vec::new();
    for (offset, raw) in source.lines().enumerate() {
        let number = offset + 1;
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }
        let tokens = tokenize(text).map_err(|column| {
            CompileError::new(
                number,
                format!("unrecognised text at column {}", column + 1),
            )
        })?;
        lines.push(SourceLine {
            number,
            text: text.to_string(),
            tokens,
        });
    }
    Ok(lines)
}

/// Compile prog source against its declared signature.
///
/// Errors carry the 1-based line of the failure; line 0 means the signature
/// itself is invalid.
pub fn compile(
    source: &str,
    parameters: &[Parameter],
    return_type: TypeDescriptor,
    env: &CompileEnv<'_>,
) -> Result<Vec<Statement>> {
    let lines = split_lines(source)?;

    let mut space = VariableSpace::new();
    for parameter in parameters {
        if parameter.ty.is_void() {
            return Err(CompileError::new(
                0,
                format!("parameter '{}' cannot be void", parameter.name),
            ));
        }
        space
            .declare(&parameter.name, parameter.ty)
            .map_err(|message| CompileError::new(0, message))?;
    }
    if !return_type.is_void() {
        space
            .declare(RETURN_SLOT, return_type)
            .map_err(|message| CompileError::new(0, message))?;
    }

    let mut compiler = Compiler {
        lines,
        env,
        return_type: return_type.without_literal(),
        loop_depth: 0,
    };

    let mut statements = Vec::new();
    let mut index = 0;
    while index < compiler.lines.len() {
        let (statement, next) = compiler.compile_statement(&mut space, index)?;
        statements.push(statement);
        index = next;
    }

    if !return_type.is_void() && block_result(&statements) != StatementResult::Return {
        let last = compiler.lines.last().map(|line| line.number).unwrap_or(0);
        return Err(CompileError::new(last, "not all code paths return a value"));
    }

    debug!(
        statements = statements.len(),
        parameters = parameters.len(),
        returns = %return_type,
        "compiled prog"
    );
    Ok(statements)
}
