//! Built-ins that reach the host simulation.

use prog_runtime::{CallContext, ExecutionFault, FunctionDescriptor, ParamSpec, ReturnSpec};
use prog_types::{BaseType, TypeDescriptor, Value};

use crate::args;

const PERCEIVABLE: ParamSpec = ParamSpec::Exact(TypeDescriptor::scalar(BaseType::Perceivable));

pub fn descriptors() -> Vec<FunctionDescriptor> {
    vec![
        FunctionDescriptor::new(
            "isnull",
            "world",
            "Whether a value is null: `isnull(x)`",
            vec![ParamSpec::AnyValue],
            ReturnSpec::Fixed(TypeDescriptor::BOOLEAN),
            isnull,
        ),
        FunctionDescriptor::new(
            "now",
            "world",
            "Current in-world time: `now()`",
            vec![],
            ReturnSpec::Fixed(TypeDescriptor::DATETIME),
            now,
        ),
        FunctionDescriptor::new(
            "send",
            "world",
            "Deliver text to an entity: `send(target, text)`",
            vec![PERCEIVABLE, ParamSpec::Exact(TypeDescriptor::TEXT)],
            ReturnSpec::Fixed(TypeDescriptor::VOID),
            send,
        ),
    ]
}

fn isnull(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    Ok(Value::boolean(args::value(ctx, args, 0)?.is_null()))
}

fn now(ctx: &mut CallContext<'_>, _: &[Value]) -> Result<Value, ExecutionFault> {
    Ok(Value::datetime(ctx.now()))
}

fn send(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    let target = args::entity(ctx, args, 0)?;
    let text = args::text(ctx, args, 1)?;
    ctx.host.output(target, text);
    Ok(Value::void())
}
