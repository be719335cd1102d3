//! Sequence and mapping built-ins
//!
//! Values are immutable, so the "mutating" built-ins (`additem`, `removeat`,
//! `setkey`) return a new collection; prog code assigns it back.

use indexmap::IndexMap;

use prog_compiler::{ArgInfo, RegisterSchema};
use prog_runtime::{CallContext, ExecutionFault, FunctionDescriptor, ParamSpec, ReturnSpec};
use prog_types::{BaseType, Payload, TypeDescriptor, Value};

use crate::args;

const TEXT: ParamSpec = ParamSpec::Exact(TypeDescriptor::TEXT);

pub fn descriptors() -> Vec<FunctionDescriptor> {
    vec![
        FunctionDescriptor::new(
            "count",
            "collections",
            "Number of items in a sequence: `count(seq)`",
            vec![ParamSpec::AnySequence],
            ReturnSpec::Fixed(TypeDescriptor::NUMBER),
            count,
        ),
        FunctionDescriptor::new(
            "count",
            "collections",
            "Number of keys in a mapping: `count(map)`",
            vec![ParamSpec::AnyMapping],
            ReturnSpec::Fixed(TypeDescriptor::NUMBER),
            count,
        ),
        FunctionDescriptor::new(
            "additem",
            "collections",
            "Copy of a sequence with an item appended: `additem(seq, item)`",
            vec![ParamSpec::AnySequence, ParamSpec::AnyScalar],
            ReturnSpec::Resolved(same_sequence_with_item),
            additem,
        ),
        FunctionDescriptor::new(
            "removeat",
            "collections",
            "Copy of a sequence without the item at a 0-based index: `removeat(seq, n)`",
            vec![ParamSpec::AnySequence, ParamSpec::Exact(TypeDescriptor::NUMBER)],
            ReturnSpec::Resolved(first_argument),
            removeat,
        ),
        FunctionDescriptor::new(
            "has",
            "collections",
            "Whether a sequence holds an item: `has(seq, item)`",
            vec![ParamSpec::AnySequence, ParamSpec::AnyScalar],
            ReturnSpec::Fixed(TypeDescriptor::BOOLEAN),
            has,
        ),
        FunctionDescriptor::new(
            "keys",
            "collections",
            "Keys of a mapping, in insertion order: `keys(map)`",
            vec![ParamSpec::AnyMapping],
            ReturnSpec::Fixed(TypeDescriptor::sequence_of(BaseType::Text)),
            keys,
        ),
        FunctionDescriptor::new(
            "values",
            "collections",
            "Values of a mapping, in insertion order: `values(map)`",
            vec![ParamSpec::AnyMapping],
            ReturnSpec::Resolved(values_of_mapping),
            values,
        ),
        FunctionDescriptor::new(
            "setkey",
            "collections",
            "Copy of a mapping with a key set: `setkey(map, key, value)`",
            vec![ParamSpec::AnyMapping, TEXT, ParamSpec::AnyScalar],
            ReturnSpec::Resolved(same_mapping_with_value),
            setkey,
        ),
        FunctionDescriptor::new(
            "haskey",
            "collections",
            "Whether a mapping has a key: `haskey(map, key)`",
            vec![ParamSpec::AnyMapping, TEXT],
            ReturnSpec::Fixed(TypeDescriptor::BOOLEAN),
            haskey,
        ),
    ]
}

fn first_argument(args: &[ArgInfo], _: &dyn RegisterSchema) -> Result<TypeDescriptor, String> {
    Ok(args[0].ty.without_literal())
}

fn same_sequence_with_item(args: &[ArgInfo], _: &dyn RegisterSchema) -> Result<TypeDescriptor, String> {
    let sequence = args[0].ty.without_literal();
    check_element(sequence, args[1].ty)?;
    Ok(sequence)
}

fn same_mapping_with_value(args: &[ArgInfo], _: &dyn RegisterSchema) -> Result<TypeDescriptor, String> {
    let mapping = args[0].ty.without_literal();
    check_element(mapping, args[2].ty)?;
    Ok(mapping)
}

fn values_of_mapping(args: &[ArgInfo], _: &dyn RegisterSchema) -> Result<TypeDescriptor, String> {
    Ok(TypeDescriptor::sequence_of(args[0].ty.base()))
}

fn check_element(collection: TypeDescriptor, item: TypeDescriptor) -> Result<(), String> {
    let element = collection.element();
    if item.compatible_with(&element) {
        Ok(())
    } else {
        Err(format!("cannot put {} into {}", item.without_literal(), collection))
    }
}

fn mapping<'v>(
    ctx: &CallContext<'_>,
    value: &'v Value,
) -> Result<Option<&'v IndexMap<String, Value>>, ExecutionFault> {
    match value.payload() {
        Payload::Mapping(entries) => Ok(Some(entries)),
        Payload::Null => Ok(None),
        _ => Err(ctx.fail("expected a mapping")),
    }
}

fn count(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    let value = args::value(ctx, args, 0)?;
    let n = match value.payload() {
        Payload::Sequence(items) => items.len(),
        Payload::Mapping(entries) => entries.len(),
        Payload::MultiMapping(entries) => entries.len(),
        Payload::Null => 0,
        _ => return Err(ctx.fail("expected a collection")),
    };
    Ok(Value::number(n as f64))
}

fn additem(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    let sequence = args::value(ctx, args, 0)?;
    let mut items = args::items(ctx, args, 0)?.to_vec();
    items.push(args::value(ctx, args, 1)?.clone());
    Ok(Value::sequence(sequence.ty().base(), items))
}

fn removeat(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    let sequence = args::value(ctx, args, 0)?;
    let mut items = args::items(ctx, args, 0)?.to_vec();
    let index = args::number(ctx, args, 1)?;
    if index < 0.0 || index.fract() != 0.0 || index as usize >= items.len() {
        return Err(ExecutionFault::IndexOutOfRange {
            index,
            len: items.len(),
        });
    }
    items.remove(index as usize);
    Ok(Value::sequence(sequence.ty().base(), items))
}

fn has(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    let needle = args::value(ctx, args, 1)?;
    let found = args::items(ctx, args, 0)?
        .iter()
        .any(|item| item.same_value(needle));
    Ok(Value::boolean(found))
}

fn keys(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    let keys = mapping(ctx, args::value(ctx, args, 0)?)?
        .map(|entries| entries.keys().map(|k| Value::text(k.clone())).collect())
        .unwrap_or_default();
    Ok(Value::sequence(BaseType::Text, keys))
}

fn values(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    let map = args::value(ctx, args, 0)?;
    let values = mapping(ctx, map)?
        .map(|entries| entries.values().cloned().collect())
        .unwrap_or_default();
    Ok(Value::sequence(map.ty().base(), values))
}

fn setkey(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    let map = args::value(ctx, args, 0)?;
    let mut entries = mapping(ctx, map)?.cloned().unwrap_or_default();
    let key = args::text(ctx, args, 1)?.to_string();
    entries.insert(key, args::value(ctx, args, 2)?.clone());
    Ok(Value::mapping(map.ty().base(), entries))
}

fn haskey(ctx: &mut CallContext<'_>, args: &[Value]) -> Result<Value, ExecutionFault> {
    let key = args::text(ctx, args, 1)?;
    let found = mapping(ctx, args::value(ctx, args, 0)?)?
        .is_some_and(|entries| entries.contains_key(key));
    Ok(Value::boolean(found))
}
