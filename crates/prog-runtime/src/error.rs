//! Runtime errors
//!
//! Two families: [`RuntimeError`] for operations on the engine, register and
//! scheduler, returned to the caller; and [`ExecutionFault`] for failures
//! while a prog runs, which never leave [`crate::Engine::execute`] and are
//! reported to the notifier instead.

use thiserror::Error;

use prog_compiler::{CompileError, ProgId};
use prog_types::{BaseType, TypeDescriptor, TypeError};

use crate::schedule::ScheduleId;

/// Runtime result type
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors from engine, register and scheduler operations.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("prog not found: {0}")]
    UnknownProg(ProgId),

    #[error("a prog named '{0}' already exists")]
    DuplicateProgName(String),

    #[error("prog id {0} is already in use")]
    DuplicateProgId(ProgId),

    #[error("prog '{prog}' failed to compile: {error}")]
    Compile {
        prog: String,
        #[source]
        error: CompileError,
    },

    #[error("register property {category}.{name} is already declared")]
    DuplicateProperty { category: BaseType, name: String },

    #[error("register property {category}.{name} is not declared")]
    UnknownProperty { category: BaseType, name: String },

    #[error("register properties need a concrete entity category, not {0}")]
    UnionCategory(BaseType),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: TypeDescriptor,
        found: TypeDescriptor,
    },

    #[error("invalid default for {category}.{name}: {reason}")]
    InvalidDefault {
        category: BaseType,
        name: String,
        reason: String,
    },

    #[error("schedule not found: {0}")]
    UnknownSchedule(ScheduleId),

    #[error("invalid interval: {0}")]
    Interval(String),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary encoding error: {0}")]
    Binary(#[from] bincode::Error),
}

/// A failure during prog execution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionFault {
    #[error("cannot apply {operation} to null")]
    NullOperand { operation: &'static str },

    #[error("division by zero")]
    DivisionByZero,

    #[error("index {index} is out of range for a sequence of {len}")]
    IndexOutOfRange { index: f64, len: usize },

    #[error("key '{0}' not found")]
    KeyNotFound(String),

    #[error("variable '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("{name}: {message}")]
    Function { name: String, message: String },

    #[error("argument '{parameter}' must be {expected}, found {found}")]
    ArgumentType {
        parameter: String,
        expected: TypeDescriptor,
        found: TypeDescriptor,
    },

    #[error("recursion depth exceeded {depth}")]
    RecursionLimit { depth: usize },

    #[error("prog '{0}' is not compiled")]
    NotCompiled(String),

    #[error("prog {0} does not exist")]
    UnknownProg(ProgId),

    #[error("invalid operation: {0}")]
    Invalid(String),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("line {line}: {fault}")]
    AtLine {
        line: usize,
        #[source]
        fault: Box<ExecutionFault>,
    },
}

impl ExecutionFault {
    /// Attach a source line, unless one is already attached.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            located @ ExecutionFault::AtLine { .. } => located,
            fault => ExecutionFault::AtLine {
                line,
                fault: Box::new(fault),
            },
        }
    }

    /// The fault without its line information.
    pub fn root(&self) -> &ExecutionFault {
        match self {
            ExecutionFault::AtLine { fault, .. } => fault.root(),
            fault => fault,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            ExecutionFault::AtLine { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub fn is_recursion_limit(&self) -> bool {
        matches!(self.root(), ExecutionFault::RecursionLimit { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_wins() {
        let fault = ExecutionFault::DivisionByZero.at_line(4).at_line(1);
        assert_eq!(fault.line(), Some(4));
        assert_eq!(fault.to_string(), "line 4: division by zero");
    }

    #[test]
    fn test_recursion_limit_seen_through_line() {
        let fault = ExecutionFault::RecursionLimit { depth: 250 }.at_line(2);
        assert!(fault.is_recursion_limit());
        assert!(!ExecutionFault::DivisionByZero.is_recursion_limit());
    }
}
