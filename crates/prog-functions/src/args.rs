//! Argument extraction shared by the built-ins.

use prog_runtime::{CallContext, ExecutionFault};
use prog_types::{EntityRef, Payload, Value};

fn arg<'v>(ctx: &CallContext<'_>, args: &'v [Value], index: usize) -> Result<&'v Value, ExecutionFault> {
    args.get(index)
        .ok_or_else(|| ctx.fail(format!("missing argument {}", index + 1)))
}

pub fn number(ctx: &CallContext<'_>, args: &[Value], index: usize) -> Result<f64, ExecutionFault> {
    let value = arg(ctx, args, index)?;
    value
        .as_number()
        .ok_or_else(|| ctx.fail(format!("argument {} must be a number, not {}", index + 1, value)))
}

pub fn text<'v>(ctx: &CallContext<'_>, args: &'v [Value], index: usize) -> Result<&'v str, ExecutionFault> {
    let value = arg(ctx, args, index)?;
    value
        .as_text()
        .ok_or_else(|| ctx.fail(format!("argument {} must be text, not {}", index + 1, value)))
}

pub fn entity(ctx: &CallContext<'_>, args: &[Value], index: usize) -> Result<EntityRef, ExecutionFault> {
    let value = arg(ctx, args, index)?;
    value
        .as_entity()
        .ok_or_else(|| ctx.fail(format!("argument {} must be an entity, not {}", index + 1, value)))
}

pub fn value<'v>(ctx: &CallContext<'_>, args: &'v [Value], index: usize) -> Result<&'v Value, ExecutionFault> {
    arg(ctx, args, index)
}

/// Items of a sequence argument; a null sequence has none.
pub fn items<'v>(ctx: &CallContext<'_>, args: &'v [Value], index: usize) -> Result<&'v [Value], ExecutionFault> {
    let value = arg(ctx, args, index)?;
    match value.payload() {
        Payload::Sequence(items) => Ok(items),
        Payload::Null => Ok(&[]),
        _ => Err(ctx.fail(format!("argument {} must be a sequence", index + 1))),
    }
}
