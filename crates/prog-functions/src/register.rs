//! Variable Register access from prog code
//!
//! The property name must be a text literal so the compiler can look up
//! its declared type: `getregister(ch, "mood")` is typed by the `mood`
//! declaration of the character category.

use prog_compiler::{ArgInfo, RegisterSchema};
use prog_runtime::{CallContext, ExecutionFault, FunctionDescriptor, ParamSpec, ReturnSpec};
use prog_types::{TypeDescriptor, Value};

use crate::args;

pub fn descriptors() -> Vec<FunctionDescriptor> {
    vec![
        FunctionDescriptor::new(
            "getregister",
            "register",
            "Read a register property: `getregister(entity, \"property\")`",
            vec![ParamSpec::AnyEntity, ParamSpec::LiteralText],
            ReturnSpec::Resolved(property_type),
            getregister,
        ),
        FunctionDescriptor::new(
            "setregister",
            "register",
            "Store a register property, returning whether it was accepted: \
             `setregister(entity, \"property\", value)`",
            vec![ParamSpec::AnyEntity, ParamSpec::LiteralText, ParamSpec::AnyValue],
            ReturnSpec::Resolved(settable_property),
            setregister,
        ),
        FunctionDescriptor::new(
            "resetregister",
            "register",
            "Drop a stored register value so the default applies again: \
             `resetregister(entity, \"property\")`",
            vec![ParamSpec::AnyEntity, ParamSpec::LiteralText],
            ReturnSpec::Resolved(resettable_property),
            resetregister,
        ),
    ]
}

/// Declared type of the property named by the literal second argument.
fn declared(args: &[ArgInfo], schema: &dyn RegisterSchema) -> Result<TypeDescriptor, String> {
    let category = args[0].ty.base();
    if category.is_union() {
        return Err(format!(
            "register properties belong to a concrete entity type, not {}",
            category
        ));
    }
    let name = args[1]
        .literal_text
        .as_deref()
        .ok_or_else(|| "the property name must be a text literal".to_string())?;
    schema
        .property_type(category, name)
        .ok_or_else(|| format!("{} has no register property '{}'", category, name))
}

fn property_type(args: &[ArgInfo], schema: &dyn RegisterSchema) -> Result<TypeDescriptor, String> {
    declared(args, schema)
}

fn settable_property(args: &[ArgInfo], schema: &dyn RegisterSchema) -> Result<TypeDescriptor, String> {
    let ty = declared(args, schema)?;
    if !args[2].ty.compatible_with(&ty) {
        return Err(format!(
            "cannot store {} in a {} property",
            args[2].ty.without_literal(),
            ty
        ));
    }
    Ok(TypeDescriptor::BOOLEAN)
}

fn resettable_property(args: &[ArgInfo], schema: &dyn RegisterSchema) -> Result<TypeDescriptor, String> {
    declared(args, schema)?;
    Ok(TypeDescriptor::BOOLEAN)
}

fn getregister(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    let entity = args::entity(ctx, args, 0)?;
    let name = args::text(ctx, args, 1)?;
    ctx.register.get(entity, name).map_err(|e| ctx.fail(e.to_string()))
}

fn setregister(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    let entity = args::entity(ctx, args, 0)?;
    let name = args::text(ctx, args, 1)?;
    let value = args::value(ctx, args, 2)?.clone();
    Ok(Value::boolean(ctx.register.set(entity, name, value).is_ok()))
}

fn resetregister(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    let entity = args::entity(ctx, args, 0)?;
    let name = args::text(ctx, args, 1)?;
    ctx.register
        .reset_to_default(entity, name)
        .map(Value::boolean)
        .map_err(|e| ctx.fail(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::call_with;
    use prog_runtime::VariableRegister;
    use prog_types::{BaseType, EntityRef};

    fn register() -> VariableRegister {
        let mut register = VariableRegister::new();
        register
            .register_property(BaseType::Character, "mood", TypeDescriptor::TEXT, Some(Value::text("calm")))
            .unwrap();
        register
    }

    fn literal(text: &str) -> ArgInfo {
        ArgInfo {
            ty: TypeDescriptor::TEXT.as_literal(),
            literal_text: Some(text.to_string()),
        }
    }

    fn character() -> ArgInfo {
        ArgInfo {
            ty: TypeDescriptor::scalar(BaseType::Character),
            literal_text: None,
        }
    }

    #[test]
    fn test_return_type_from_declaration() {
        let register = register();
        assert_eq!(
            property_type(&[character(), literal("MOOD")], &register).unwrap(),
            TypeDescriptor::TEXT
        );
        assert!(property_type(&[character(), literal("hunger")], &register).is_err());

        let perceiver = ArgInfo {
            ty: TypeDescriptor::scalar(BaseType::Perceiver),
            literal_text: None,
        };
        assert!(property_type(&[perceiver, literal("mood")], &register).is_err());
    }

    #[test]
    fn test_set_rejects_wrong_type_at_compile_time() {
        let register = register();
        let number = ArgInfo {
            ty: TypeDescriptor::NUMBER,
            literal_text: None,
        };
        assert!(settable_property(&[character(), literal("mood"), number], &register).is_err());
    }

    #[test]
    fn test_get_set_reset() {
        let mut register = register();
        let alice = Value::entity(EntityRef::new(BaseType::Character, 1));
        let mood = Value::text("mood");

        let stored = call_with(setregister, &mut register, &[alice.clone(), mood.clone(), Value::text("angry")]);
        assert_eq!(stored.unwrap(), Value::boolean(true));
        let rejected = call_with(setregister, &mut register, &[alice.clone(), mood.clone(), Value::number(1.0)]);
        assert_eq!(rejected.unwrap(), Value::boolean(false));

        let read = call_with(getregister, &mut register, &[alice.clone(), mood.clone()]);
        assert_eq!(read.unwrap(), Value::text("angry"));

        let reset = call_with(resetregister, &mut register, &[alice.clone(), mood.clone()]);
        assert_eq!(reset.unwrap(), Value::boolean(true));
        let read = call_with(getregister, &mut register, &[alice, mood]);
        assert_eq!(read.unwrap(), Value::text("calm"));
    }
}
