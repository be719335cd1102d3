//! Token stream over a single source line.

use crate::error::CompileError;
use crate::lexer::{Spanned, Token};

/// Token stream with lookahead, tied to one source line for error reporting
/// and raw-text slicing.
pub struct TokenStream<'src> {
    tokens: &'src [Spanned],
    source: &'src str,
    line: usize,
    pos: usize,
}

impl<'src> TokenStream<'src> {
    /// Create a stream over `tokens`, which were lexed from `source` at `line`.
    pub fn new(tokens: &'src [Spanned], source: &'src str, line: usize) -> Self {
        Self {
            tokens,
            source,
            line,
            pos: 0,
        }
    }

    /// Line number used in errors.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> Option<&'src Token> {
        self.tokens.get(self.pos).map(|(tok, _)| tok)
    }

    /// Peek at the nth token ahead without consuming.
    pub fn peek_nth(&self, n: usize) -> Option<&'src Token> {
        self.tokens.get(self.pos + n).map(|(tok, _)| tok)
    }

    /// Advance to the next token and return the current one.
    pub fn advance(&mut self) -> Option<&'src Token> {
        let token = self.tokens.get(self.pos).map(|(tok, _)| tok);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Check if the current token matches the expected token kind.
    pub fn check(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some(t) if std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    /// Expect a specific token and advance if it matches.
    pub fn expect(&mut self, expected: Token) -> Result<(), CompileError> {
        if self.check(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(match self.peek() {
                Some(found) => format!("expected '{}', found '{}'", expected, found),
                None => format!("expected '{}', found end of line", expected),
            }))
        }
    }

    /// Check if we've reached the end of the token stream.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Current position in the token stream.
    pub fn current_pos(&self) -> usize {
        self.pos
    }

    /// Raw source text covered by tokens `start..end` (token indices).
    pub fn text_between(&self, start: usize, end: usize) -> &'src str {
        if start >= end || start >= self.tokens.len() {
            return "";
        }
        let from = self.tokens[start].1.start;
        let to = self.tokens[end.min(self.tokens.len()) - 1].1.end;
        &self.source[from..to]
    }

    /// Build an error at this line.
    pub fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::new(self.line, message)
    }
}
