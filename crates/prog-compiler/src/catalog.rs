//! Compile-time catalogs
//!
//! The compiler never executes anything, but it has to know what the names
//! in a line refer to. Three seams supply that knowledge:
//!
//! - [`FunctionCatalog`] resolves built-in function calls to a [`FunctionId`]
//! - [`ProgCatalog`] resolves `@name(...)` calls to another prog's signature
//! - [`RegisterSchema`] exposes declared Variable Register property types
//!
//! The runtime implements all three; [`CompileEnv::empty`] provides inert
//! versions for compiling progs that use none of them.

use std::fmt;

use serde::{Deserialize, Serialize};

use prog_types::{BaseType, TypeDescriptor};

use crate::ast::Parameter;

/// Identity of a prog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgId(pub u64);

impl fmt::Display for ProgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a built-in function overload in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub usize);

/// What the compiler knows about one call argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgInfo {
    pub ty: TypeDescriptor,
    /// The argument's text, when it is a text literal.
    pub literal_text: Option<String>,
}

/// A resolved function call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionBinding {
    pub id: FunctionId,
    pub return_type: TypeDescriptor,
}

/// Declared shape of a prog, as seen by callers.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgSignature {
    pub id: ProgId,
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeDescriptor,
    pub accepts_any_parameters: bool,
}

/// Resolves built-in function calls.
pub trait FunctionCatalog {
    /// Pick the overload of `name` matching `args`, or explain why none does.
    fn resolve(
        &self,
        name: &str,
        args: &[ArgInfo],
        registers: &dyn RegisterSchema,
    ) -> Result<FunctionBinding, String>;
}

/// Resolves prog calls by name (case-insensitive).
pub trait ProgCatalog {
    fn signature(&self, name: &str) -> Option<ProgSignature>;
}

/// Declared Variable Register property types.
pub trait RegisterSchema {
    fn property_type(&self, category: BaseType, property: &str) -> Option<TypeDescriptor>;
}

/// Everything a compilation may consult.
#[derive(Clone, Copy)]
pub struct CompileEnv<'a> {
    pub functions: &'a dyn FunctionCatalog,
    pub progs: &'a dyn ProgCatalog,
    pub registers: &'a dyn RegisterSchema,
}

impl CompileEnv<'static> {
    /// An environment with no functions, no other progs and no registers.
    pub fn empty() -> Self {
        Self {
            functions: &NoFunctions,
            progs: &NoProgs,
            registers: &NoRegisters,
        }
    }
}

struct NoFunctions;

impl FunctionCatalog for NoFunctions {
    fn resolve(&self, name: &str, _: &[ArgInfo], _: &dyn RegisterSchema) -> Result<FunctionBinding, String> {
        Err(format!("unknown function '{}'", name))
    }
}

struct NoProgs;

impl ProgCatalog for NoProgs {
    fn signature(&self, _: &str) -> Option<ProgSignature> {
        None
    }
}

struct NoRegisters;

impl RegisterSchema for NoRegisters {
    fn property_type(&self, _: BaseType, _: &str) -> Option<TypeDescriptor> {
        None
    }
}
