//! Host-side values and marshalling
//!
//! The host simulation hands the engine [`NativeValue`]s and receives them
//! back. [`marshal`] converts a native value into a [`Value`] of a declared
//! type, recursing through containers with the element type; absent values
//! become typed nulls instead of failures.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::base::{BaseType, PayloadKind};
use crate::descriptor::{Container, TypeDescriptor};
use crate::entity::EntityRef;
use crate::error::TypeError;
use crate::time::{CalendarTime, TimeSpan};
use crate::value::{Payload, Value};

/// A value as the host simulation sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NativeValue {
    Null,
    Text(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    /// A host enumeration; prog code sees its description.
    Enumerated {
        name: String,
        description: String,
    },
    DateTime(CalendarTime),
    TimeSpan(TimeSpan),
    Entity(EntityRef),
    List(Vec<NativeValue>),
    Map(IndexMap<String, NativeValue>),
    MultiMap(IndexMap<String, Vec<NativeValue>>),
}

impl NativeValue {
    /// Short description of the native shape, used in marshalling errors.
    pub fn kind_name(&self) -> String {
        match self {
            NativeValue::Null => "null".to_string(),
            NativeValue::Text(_) => "text".to_string(),
            NativeValue::Number(_) | NativeValue::Integer(_) => "number".to_string(),
            NativeValue::Boolean(_) => "boolean".to_string(),
            NativeValue::Enumerated { name, .. } => format!("enumeration {}", name),
            NativeValue::DateTime(_) => "datetime".to_string(),
            NativeValue::TimeSpan(_) => "timespan".to_string(),
            NativeValue::Entity(e) => e.category.to_string(),
            NativeValue::List(_) => "list".to_string(),
            NativeValue::Map(_) => "map".to_string(),
            NativeValue::MultiMap(_) => "multi-map".to_string(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            NativeValue::Number(n) => Some(*n),
            NativeValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl From<f64> for NativeValue {
    fn from(value: f64) -> Self {
        NativeValue::Number(value)
    }
}

impl From<i64> for NativeValue {
    fn from(value: i64) -> Self {
        NativeValue::Integer(value)
    }
}

impl From<bool> for NativeValue {
    fn from(value: bool) -> Self {
        NativeValue::Boolean(value)
    }
}

impl From<&str> for NativeValue {
    fn from(value: &str) -> Self {
        NativeValue::Text(value.to_string())
    }
}

impl From<String> for NativeValue {
    fn from(value: String) -> Self {
        NativeValue::Text(value)
    }
}

impl From<EntityRef> for NativeValue {
    fn from(value: EntityRef) -> Self {
        NativeValue::Entity(value)
    }
}

fn mismatch(expected: TypeDescriptor, native: &NativeValue) -> TypeError {
    TypeError::Marshal {
        expected,
        found: native.kind_name(),
    }
}

/// Convert a host value into a runtime value of the declared type.
pub fn marshal(ty: TypeDescriptor, native: &NativeValue) -> Result<Value, TypeError> {
    let ty = ty.without_literal();
    if matches!(native, NativeValue::Null) {
        return Ok(Value::null(ty));
    }

    let element = ty.element();
    match ty.container() {
        Container::Scalar => marshal_scalar(ty, native),
        Container::Sequence => match native {
            NativeValue::List(items) => {
                let items = items
                    .iter()
                    .map(|item| marshal(element, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::sequence(ty.base(), items))
            }
            other => Err(mismatch(ty, other)),
        },
        Container::Mapping => match native {
            NativeValue::Map(entries) => {
                let mut out = IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    out.insert(key.clone(), marshal(element, value)?);
                }
                Ok(Value::mapping(ty.base(), out))
            }
            other => Err(mismatch(ty, other)),
        },
        Container::MultiMapping => match native {
            NativeValue::MultiMap(entries) => {
                let mut out = IndexMap::with_capacity(entries.len());
                for (key, values) in entries {
                    let values = values
                        .iter()
                        .map(|value| marshal(element, value))
                        .collect::<Result<Vec<_>, _>>()?;
                    out.insert(key.clone(), values);
                }
                Ok(Value::multi_mapping(ty.base(), out))
            }
            other => Err(mismatch(ty, other)),
        },
    }
}

fn marshal_scalar(ty: TypeDescriptor, native: &NativeValue) -> Result<Value, TypeError> {
    let base = ty.base();
    match (base.payload_kind(), native) {
        (PayloadKind::Text, NativeValue::Text(s)) => Ok(Value::text_as(base, s.clone())),
        (PayloadKind::Text, NativeValue::Enumerated { description, .. }) => {
            Ok(Value::text_as(base, description.clone()))
        }
        (PayloadKind::Number, other) => other
            .as_number()
            .map(Value::number)
            .ok_or_else(|| mismatch(ty, other)),
        (PayloadKind::Boolean, NativeValue::Boolean(b)) => Ok(Value::boolean(*b)),
        (PayloadKind::DateTime, NativeValue::DateTime(t)) => Ok(Value::datetime(*t)),
        (PayloadKind::TimeSpan, NativeValue::TimeSpan(s)) => Ok(Value::timespan(*s)),
        (PayloadKind::Entity | PayloadKind::Dynamic, NativeValue::Entity(e))
            if base.accepts(e.category) =>
        {
            Ok(Value::entity(*e))
        }
        (PayloadKind::Dynamic, other) if base == BaseType::Anything => infer(other),
        (_, other) => Err(mismatch(ty, other)),
    }
}

/// Marshal a scalar native value into its most natural runtime type.
fn infer(native: &NativeValue) -> Result<Value, TypeError> {
    match native {
        NativeValue::Null => Ok(Value::null(TypeDescriptor::ANYTHING)),
        NativeValue::Text(s) => Ok(Value::text(s.clone())),
        NativeValue::Enumerated { description, .. } => Ok(Value::text(description.clone())),
        NativeValue::Number(n) => Ok(Value::number(*n)),
        NativeValue::Integer(i) => Ok(Value::number(*i as f64)),
        NativeValue::Boolean(b) => Ok(Value::boolean(*b)),
        NativeValue::DateTime(t) => Ok(Value::datetime(*t)),
        NativeValue::TimeSpan(s) => Ok(Value::timespan(*s)),
        NativeValue::Entity(e) => Ok(Value::entity(*e)),
        other => Err(mismatch(TypeDescriptor::ANYTHING, other)),
    }
}

impl Value {
    /// Convert back into a host value.
    pub fn to_native(&self) -> NativeValue {
        match self.payload() {
            Payload::Null => NativeValue::Null,
            Payload::Text(s) => NativeValue::Text(s.clone()),
            Payload::Number(n) => NativeValue::Number(*n),
            Payload::Boolean(b) => NativeValue::Boolean(*b),
            Payload::DateTime(t) => NativeValue::DateTime(*t),
            Payload::TimeSpan(s) => NativeValue::TimeSpan(*s),
            Payload::Entity(e) => NativeValue::Entity(*e),
            Payload::Sequence(items) => NativeValue::List(items.iter().map(Value::to_native).collect()),
            Payload::Mapping(entries) => NativeValue::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_native()))
                    .collect(),
            ),
            Payload::MultiMapping(entries) => NativeValue::MultiMap(
                entries
                    .iter()
                    .map(|(k, vs)| (k.clone(), vs.iter().map(Value::to_native).collect()))
                    .collect(),
            ),
        }
    }
}
