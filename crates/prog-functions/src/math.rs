//! Numeric built-ins

use prog_runtime::{CallContext, ExecutionFault, FunctionDescriptor, ParamSpec, ReturnSpec};
use prog_types::{TypeDescriptor, Value};

use crate::args;

const NUMBER: ParamSpec = ParamSpec::Exact(TypeDescriptor::NUMBER);
const RETURNS_NUMBER: ReturnSpec = ReturnSpec::Fixed(TypeDescriptor::NUMBER);

pub fn descriptors() -> Vec<FunctionDescriptor> {
    vec![
        FunctionDescriptor::new("abs", "math", "Absolute value: `abs(x)`", vec![NUMBER], RETURNS_NUMBER, abs),
        FunctionDescriptor::new("min", "math", "Smaller of two numbers: `min(a, b)`", vec![NUMBER, NUMBER], RETURNS_NUMBER, min),
        FunctionDescriptor::new("max", "math", "Larger of two numbers: `max(a, b)`", vec![NUMBER, NUMBER], RETURNS_NUMBER, max),
        FunctionDescriptor::new("round", "math", "Round half away from zero: `round(x)`", vec![NUMBER], RETURNS_NUMBER, round),
        FunctionDescriptor::new("floor", "math", "Round down: `floor(x)`", vec![NUMBER], RETURNS_NUMBER, floor),
        FunctionDescriptor::new("ceiling", "math", "Round up: `ceiling(x)`", vec![NUMBER], RETURNS_NUMBER, ceiling),
    ]
}

fn unary(ctx: &CallContext<'_>, args: &[Value], f: fn(f64) -> f64) -> Result<Value, ExecutionFault> {
    Ok(Value::number(f(args::number(ctx, args, 0)?)))
}

fn abs(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    unary(ctx, args, f64::abs)
}

fn round(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    unary(ctx, args, f64::round)
}

fn floor(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    unary(ctx, args, f64::floor)
}

fn ceiling(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    unary(ctx, args, f64::ceil)
}

fn min(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    let a = args::number(ctx, args, 0)?;
    let b = args::number(ctx, args, 1)?;
    Ok(Value::number(a.min(b)))
}

fn max(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    let a = args::number(ctx, args, 0)?;
    let b = args::number(ctx, args, 1)?;
    Ok(Value::number(a.max(b)))
}
