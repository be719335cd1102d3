//! Built-in function registry
//!
//! Built-ins are plain function pointers described by a
//! [`FunctionDescriptor`]. The registry is an explicit table assembled at
//! start-up; nothing registers itself. It serves both sides of a call:
//!
//! - at compile time it implements [`FunctionCatalog`], picking the first
//!   overload whose parameter specs accept the argument types
//! - at run time [`FunctionRegistry::invoke`] dispatches by [`FunctionId`]
//!
//! # Example
//!
//! ```ignore
//! let mut registry = FunctionRegistry::new();
//! registry.register(FunctionDescriptor::new(
//!     "abs",
//!     "math",
//!     "Absolute value",
//!     vec![ParamSpec::Exact(TypeDescriptor::NUMBER)],
//!     ReturnSpec::Fixed(TypeDescriptor::NUMBER),
//!     abs,
//! ));
//! ```

use std::fmt;

use indexmap::IndexMap;

use prog_compiler::{ArgInfo, FunctionBinding, FunctionCatalog, FunctionId, RegisterSchema};
use prog_types::{CalendarTime, Container, TypeDescriptor, Value};

use crate::error::ExecutionFault;
use crate::host::Host;
use crate::register::VariableRegister;

/// What a built-in may touch while it runs.
pub struct CallContext<'a> {
    /// Name of the function being called.
    pub function: &'a str,
    pub register: &'a mut VariableRegister,
    pub host: &'a mut dyn Host,
}

impl CallContext<'_> {
    /// A fault attributed to the running function.
    pub fn fail(&self, message: impl Into<String>) -> ExecutionFault {
        ExecutionFault::Function {
            name: self.function.to_string(),
            message: message.into(),
        }
    }

    pub fn now(&self) -> CalendarTime {
        self.host.now()
    }
}

/// Signature of a built-in implementation.
pub type FunctionImpl = fn(&mut CallContext<'_>, &[Value]) -> Result<Value, ExecutionFault>;

/// Computes a return type from the argument types at compile time.
pub type ReturnResolver = fn(&[ArgInfo], &dyn RegisterSchema) -> Result<TypeDescriptor, String>;

/// Accepted argument shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSpec {
    /// Anything compatible with this descriptor.
    Exact(TypeDescriptor),
    /// A text literal (its value is known at compile time).
    LiteralText,
    /// A single non-void value of any base type.
    AnyScalar,
    /// A scalar entity reference of any kind.
    AnyEntity,
    /// Any non-void value.
    AnyValue,
    AnySequence,
    AnyMapping,
}

impl ParamSpec {
    pub fn accepts(&self, arg: &ArgInfo) -> bool {
        let ty = arg.ty;
        if ty.is_void() {
            return false;
        }
        match self {
            ParamSpec::Exact(expected) => ty.compatible_with(expected),
            ParamSpec::LiteralText => {
                ty.compatible_with(&TypeDescriptor::TEXT) && arg.literal_text.is_some()
            }
            ParamSpec::AnyScalar => ty.is_scalar(),
            ParamSpec::AnyEntity => ty.is_scalar() && ty.base().is_entity(),
            ParamSpec::AnyValue => true,
            ParamSpec::AnySequence => ty.container() == Container::Sequence,
            ParamSpec::AnyMapping => ty.container() == Container::Mapping,
        }
    }
}

impl fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamSpec::Exact(ty) => write!(f, "{}", ty),
            ParamSpec::LiteralText => f.write_str("text literal"),
            ParamSpec::AnyScalar => f.write_str("any"),
            ParamSpec::AnyEntity => f.write_str("entity"),
            ParamSpec::AnyValue => f.write_str("any value"),
            ParamSpec::AnySequence => f.write_str("any sequence"),
            ParamSpec::AnyMapping => f.write_str("any mapping"),
        }
    }
}

#[derive(Clone, Copy)]
pub enum ReturnSpec {
    Fixed(TypeDescriptor),
    Resolved(ReturnResolver),
}

/// Descriptor for a registered built-in overload.
pub struct FunctionDescriptor {
    /// Name used in prog source (matched case-insensitively).
    pub name: &'static str,
    /// Category tag (e.g. "math", "text", "register")
    pub category: &'static str,
    pub doc: &'static str,
    pub params: Vec<ParamSpec>,
    pub returns: ReturnSpec,
    pub implementation: FunctionImpl,
}

impl FunctionDescriptor {
    pub fn new(
        name: &'static str,
        category: &'static str,
        doc: &'static str,
        params: Vec<ParamSpec>,
        returns: ReturnSpec,
        implementation: FunctionImpl,
    ) -> Self {
        Self {
            name,
            category,
            doc,
            params,
            returns,
            implementation,
        }
    }

    /// Human-readable signature, e.g. `max(number, number) -> number`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        match self.returns {
            ReturnSpec::Fixed(ty) => format!("{}({}) -> {}", self.name, params.join(", "), ty),
            ReturnSpec::Resolved(_) => format!("{}({})", self.name, params.join(", ")),
        }
    }

    fn accepts(&self, args: &[ArgInfo]) -> bool {
        self.params.len() == args.len()
            && self.params.iter().zip(args).all(|(spec, arg)| spec.accepts(arg))
    }
}

impl fmt::Debug for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDescriptor")
            .field("signature", &self.signature())
            .field("category", &self.category)
            .finish()
    }
}

/// The table of built-in overloads.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: Vec<FunctionDescriptor>,
    by_name: IndexMap<String, Vec<usize>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an overload. Overloads of one name are tried in registration order.
    pub fn register(&mut self, descriptor: FunctionDescriptor) -> FunctionId {
        let id = self.functions.len();
        self.by_name
            .entry(descriptor.name.to_ascii_lowercase())
            .or_default()
            .push(id);
        self.functions.push(descriptor);
        FunctionId(id)
    }

    pub fn extend(&mut self, descriptors: impl IntoIterator<Item = FunctionDescriptor>) {
        for descriptor in descriptors {
            self.register(descriptor);
        }
    }

    pub fn get(&self, id: FunctionId) -> Option<&FunctionDescriptor> {
        self.functions.get(id.0)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.by_name.contains_key(&name.to_ascii_lowercase())
    }

    /// All overloads of `name`.
    pub fn overloads(&self, name: &str) -> impl Iterator<Item = &FunctionDescriptor> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .into_iter()
            .flatten()
            .map(|&i| &self.functions[i])
    }

    /// Distinct function names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Run overload `id`.
    pub fn invoke(
        &self,
        id: FunctionId,
        register: &mut VariableRegister,
        host: &mut dyn Host,
        args: &[Value],
    ) -> Result<Value, ExecutionFault> {
        let descriptor = self.get(id).ok_or_else(|| ExecutionFault::Function {
            name: format!("#{}", id.0),
            message: "no such function".into(),
        })?;
        let mut ctx = CallContext {
            function: descriptor.name,
            register,
            host,
        };
        (descriptor.implementation)(&mut ctx, args)
    }
}

impl FunctionCatalog for FunctionRegistry {
    fn resolve(
        &self,
        name: &str,
        args: &[ArgInfo],
        registers: &dyn RegisterSchema,
    ) -> Result<FunctionBinding, String> {
        let Some(candidates) = self.by_name.get(&name.to_ascii_lowercase()) else {
            return Err(format!("unknown function '{}'", name));
        };

        let mut resolver_error = None;
        for &index in candidates {
            let descriptor = &self.functions[index];
            if !descriptor.accepts(args) {
                continue;
            }
            let return_type = match descriptor.returns {
                ReturnSpec::Fixed(ty) => ty,
                ReturnSpec::Resolved(resolve) => match resolve(args, registers) {
                    Ok(ty) => ty,
                    Err(message) => {
                        resolver_error.get_or_insert(message);
                        continue;
                    }
                },
            };
            return Ok(FunctionBinding {
                id: FunctionId(index),
                return_type,
            });
        }

        if let Some(message) = resolver_error {
            return Err(format!("{}: {}", name, message));
        }
        let found: Vec<String> = args.iter().map(|a| a.ty.without_literal().to_string()).collect();
        let expected: Vec<String> = candidates
            .iter()
            .map(|&i| self.functions[i].signature())
            .collect();
        Err(format!(
            "no overload of '{}' accepts ({}); expected one of: {}",
            name,
            found.join(", "),
            expected.join("; ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullHost;
    use prog_types::BaseType;

    fn double(_: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
        Ok(Value::number(args[0].as_number().unwrap_or(0.0) * 2.0))
    }

    fn shout(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
        let text = args[0].as_text().ok_or_else(|| ctx.fail("null text"))?;
        Ok(Value::text(text.to_uppercase()))
    }

    fn element_of(args: &[ArgInfo], _: &dyn RegisterSchema) -> Result<TypeDescriptor, String> {
        Ok(args[0].ty.element())
    }

    fn registry() -> FunctionRegistry {
        let mut registry = FunctionRegistry::new();
        registry.register(FunctionDescriptor::new(
            "twice",
            "test",
            "",
            vec![ParamSpec::Exact(TypeDescriptor::NUMBER)],
            ReturnSpec::Fixed(TypeDescriptor::NUMBER),
            double,
        ));
        registry.register(FunctionDescriptor::new(
            "twice",
            "test",
            "",
            vec![ParamSpec::Exact(TypeDescriptor::TEXT)],
            ReturnSpec::Fixed(TypeDescriptor::TEXT),
            shout,
        ));
        registry.register(FunctionDescriptor::new(
            "first",
            "test",
            "",
            vec![ParamSpec::AnySequence],
            ReturnSpec::Resolved(element_of),
            double,
        ));
        registry
    }

    fn arg(ty: TypeDescriptor) -> ArgInfo {
        ArgInfo { ty, literal_text: None }
    }

    struct NoSchema;

    impl RegisterSchema for NoSchema {
        fn property_type(&self, _: BaseType, _: &str) -> Option<TypeDescriptor> {
            None
        }
    }

    #[test]
    fn test_overloads_resolve_by_argument_type() {
        let registry = registry();
        let number = registry.resolve("TWICE", &[arg(TypeDescriptor::NUMBER)], &NoSchema).unwrap();
        let text = registry.resolve("twice", &[arg(TypeDescriptor::TEXT)], &NoSchema).unwrap();
        assert_eq!(number.id, FunctionId(0));
        assert_eq!(text.id, FunctionId(1));
        assert_eq!(text.return_type, TypeDescriptor::TEXT);
    }

    #[test]
    fn test_resolved_return_type() {
        let registry = registry();
        let binding = registry
            .resolve("first", &[arg(TypeDescriptor::sequence_of(BaseType::Item))], &NoSchema)
            .unwrap();
        assert_eq!(binding.return_type, TypeDescriptor::scalar(BaseType::Item));
    }

    #[test]
    fn test_resolution_errors() {
        let registry = registry();
        assert!(registry.resolve("nope", &[], &NoSchema).unwrap_err().contains("unknown function"));
        let err = registry.resolve("twice", &[arg(TypeDescriptor::BOOLEAN)], &NoSchema).unwrap_err();
        assert!(err.contains("no overload"));
    }

    #[test]
    fn test_invoke_reports_function_name() {
        let registry = registry();
        let mut register = VariableRegister::new();
        let mut host = NullHost;
        let fault = registry
            .invoke(FunctionId(1), &mut register, &mut host, &[Value::null(TypeDescriptor::TEXT)])
            .unwrap_err();
        assert_eq!(
            fault,
            ExecutionFault::Function {
                name: "twice".into(),
                message: "null text".into()
            }
        );
    }
}
