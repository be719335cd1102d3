//! Type and marshalling errors

use thiserror::Error;

use crate::descriptor::TypeDescriptor;

/// Errors raised while parsing type names or marshalling host values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    #[error("empty type name")]
    EmptyTypeName,

    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("unknown type modifier: {0}")]
    UnknownModifier(String),

    /// More than one container modifier was requested.
    #[error("containers cannot be nested: {0}")]
    NestedContainer(String),

    #[error("void cannot carry modifiers")]
    ModifiedVoid,

    /// A host value could not be converted to the declared type.
    #[error("cannot marshal {found} as {expected}")]
    Marshal {
        expected: TypeDescriptor,
        found: String,
    },
}
