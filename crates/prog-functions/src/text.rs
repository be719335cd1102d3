//! Text built-ins

use prog_runtime::{CallContext, ExecutionFault, FunctionDescriptor, ParamSpec, ReturnSpec};
use prog_types::{TypeDescriptor, Value};

use crate::args;

const TEXT: ParamSpec = ParamSpec::Exact(TypeDescriptor::TEXT);

pub fn descriptors() -> Vec<FunctionDescriptor> {
    vec![
        FunctionDescriptor::new(
            "length",
            "text",
            "Number of characters: `length(s)`",
            vec![TEXT],
            ReturnSpec::Fixed(TypeDescriptor::NUMBER),
            length,
        ),
        FunctionDescriptor::new(
            "upper",
            "text",
            "Upper-case copy: `upper(s)`",
            vec![TEXT],
            ReturnSpec::Fixed(TypeDescriptor::TEXT),
            upper,
        ),
        FunctionDescriptor::new(
            "lower",
            "text",
            "Lower-case copy: `lower(s)`",
            vec![TEXT],
            ReturnSpec::Fixed(TypeDescriptor::TEXT),
            lower,
        ),
        FunctionDescriptor::new(
            "totext",
            "text",
            "Text rendering of any scalar: `totext(x)`",
            vec![ParamSpec::AnyScalar],
            ReturnSpec::Fixed(TypeDescriptor::TEXT),
            totext,
        ),
        FunctionDescriptor::new(
            "tonumber",
            "text",
            "Parse a number, or null if the text is not one: `tonumber(s)`",
            vec![TEXT],
            ReturnSpec::Fixed(TypeDescriptor::NUMBER),
            tonumber,
        ),
        FunctionDescriptor::new(
            "contains",
            "text",
            "Case-insensitive substring test: `contains(haystack, needle)`",
            vec![TEXT, TEXT],
            ReturnSpec::Fixed(TypeDescriptor::BOOLEAN),
            contains,
        ),
    ]
}

fn length(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    Ok(Value::number(args::text(ctx, args, 0)?.chars().count() as f64))
}

fn upper(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    Ok(Value::text(args::text(ctx, args, 0)?.to_uppercase()))
}

fn lower(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    Ok(Value::text(args::text(ctx, args, 0)?.to_lowercase()))
}

fn totext(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    Ok(Value::text(args::value(ctx, args, 0)?.display_text()))
}

fn tonumber(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    let text = args::text(ctx, args, 0)?;
    Ok(match text.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Value::number(n),
        _ => Value::null(TypeDescriptor::NUMBER),
    })
}

fn contains(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    let haystack = args::text(ctx, args, 0)?.to_lowercase();
    let needle = args::text(ctx, args, 1)?.to_lowercase();
    Ok(Value::boolean(haystack.contains(&needle)))
}
