//! Compile errors

use thiserror::Error;

/// A compilation failure at a 1-based source line.
///
/// Line 0 refers to the declared signature rather than the body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct CompileError {
    pub line: usize,
    pub message: String,
}

impl CompileError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Compile result type
pub type Result<T> = std::result::Result<T, CompileError>;
