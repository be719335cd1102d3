//! Runtime values
//!
//! A [`Value`] pairs a [`TypeDescriptor`] with its payload. Values are
//! immutable once built: collection "mutation" in prog code produces a new
//! value. A null value still carries its descriptor, so "no value yet" is a
//! first-class, typed state rather than an error.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::base::{BaseType, PayloadKind};
use crate::descriptor::{Container, TypeDescriptor};
use crate::entity::EntityRef;
use crate::time::{CalendarTime, TimeSpan};

/// The data carried by a [`Value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    Null,
    Text(String),
    Number(f64),
    Boolean(bool),
    DateTime(CalendarTime),
    TimeSpan(TimeSpan),
    Entity(EntityRef),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
    MultiMapping(IndexMap<String, Vec<Value>>),
}

/// A typed runtime value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    ty: TypeDescriptor,
    payload: Payload,
}

impl Value {
    /// A typed null.
    pub fn null(ty: TypeDescriptor) -> Self {
        Self {
            ty: ty.without_literal(),
            payload: Payload::Null,
        }
    }

    /// The value of a void expression.
    pub fn void() -> Self {
        Self::null(TypeDescriptor::VOID)
    }

    /// The starting value for a declaration of `ty`: empty for containers,
    /// typed null for scalars.
    pub fn empty(ty: TypeDescriptor) -> Self {
        let ty = ty.without_literal();
        let payload = match ty.container() {
            Container::Scalar => Payload::Null,
            Container::Sequence => Payload::Sequence(Vec::new()),
            Container::Mapping => Payload::Mapping(IndexMap::new()),
            Container::MultiMapping => Payload::MultiMapping(IndexMap::new()),
        };
        Self { ty, payload }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            ty: TypeDescriptor::TEXT,
            payload: Payload::Text(text.into()),
        }
    }

    /// Text carried under another text-shaped category such as gender.
    pub fn text_as(base: BaseType, text: impl Into<String>) -> Self {
        debug_assert_eq!(base.payload_kind(), PayloadKind::Text);
        Self {
            ty: TypeDescriptor::scalar(base),
            payload: Payload::Text(text.into()),
        }
    }

    pub fn number(number: f64) -> Self {
        Self {
            ty: TypeDescriptor::NUMBER,
            payload: Payload::Number(number),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            ty: TypeDescriptor::BOOLEAN,
            payload: Payload::Boolean(value),
        }
    }

    pub fn datetime(time: CalendarTime) -> Self {
        Self {
            ty: TypeDescriptor::DATETIME,
            payload: Payload::DateTime(time),
        }
    }

    pub fn timespan(span: TimeSpan) -> Self {
        Self {
            ty: TypeDescriptor::TIMESPAN,
            payload: Payload::TimeSpan(span),
        }
    }

    /// An entity reference, typed as the entity's own category.
    pub fn entity(entity: EntityRef) -> Self {
        Self {
            ty: TypeDescriptor::scalar(entity.category),
            payload: Payload::Entity(entity),
        }
    }

    /// A sequence of `element` values.
    pub fn sequence(element: BaseType, items: Vec<Value>) -> Self {
        Self {
            ty: TypeDescriptor::sequence_of(element),
            payload: Payload::Sequence(items),
        }
    }

    /// A mapping from text to `element` values.
    pub fn mapping(element: BaseType, entries: IndexMap<String, Value>) -> Self {
        Self {
            ty: TypeDescriptor::mapping_of(element),
            payload: Payload::Mapping(entries),
        }
    }

    /// A mapping from text to many `element` values.
    pub fn multi_mapping(element: BaseType, entries: IndexMap<String, Vec<Value>>) -> Self {
        Self {
            ty: TypeDescriptor::multi_mapping_of(element),
            payload: Payload::MultiMapping(entries),
        }
    }

    pub fn ty(&self) -> TypeDescriptor {
        self.ty
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    pub fn is_null(&self) -> bool {
        matches!(self.payload, Payload::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.payload {
            Payload::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.payload {
            Payload::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<EntityRef> {
        match self.payload {
            Payload::Entity(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<CalendarTime> {
        match self.payload {
            Payload::DateTime(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_timespan(&self) -> Option<TimeSpan> {
        match self.payload {
            Payload::TimeSpan(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match &self.payload {
            Payload::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match &self.payload {
            Payload::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_multi_mapping(&self) -> Option<&IndexMap<String, Vec<Value>>> {
        match &self.payload {
            Payload::MultiMapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Value equality as prog code sees it: payloads compare, declared
    /// descriptors do not (a character held in a perceiver slot still equals
    /// the same character held in a character slot).
    pub fn same_value(&self, other: &Value) -> bool {
        match (&self.payload, &other.payload) {
            (Payload::Sequence(a), Payload::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_value(y))
            }
            (Payload::Mapping(a), Payload::Mapping(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.same_value(w)))
            }
            (Payload::MultiMapping(a), Payload::MultiMapping(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, vs)| {
                        b.get(k).is_some_and(|ws| {
                            vs.len() == ws.len() && vs.iter().zip(ws).all(|(x, y)| x.same_value(y))
                        })
                    })
            }
            (a, b) => a == b,
        }
    }

    /// Text rendering used for concatenation and incident reports.
    pub fn display_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::Null => write!(f, "null"),
            Payload::Text(s) => write!(f, "{}", s),
            Payload::Number(n) => write!(f, "{}", n),
            Payload::Boolean(b) => write!(f, "{}", b),
            Payload::DateTime(t) => write!(f, "{}", t),
            Payload::TimeSpan(s) => write!(f, "{}", s),
            Payload::Entity(e) => write!(f, "{}", e),
            Payload::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Payload::Mapping(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Payload::MultiMapping(entries) => {
                write!(f, "{{")?;
                for (i, (key, values)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: [", key)?;
                    for (j, value) in values.iter().enumerate() {
                        if j > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", value)?;
                    }
                    write!(f, "]")?;
                }
                write!(f, "}}")
            }
        }
    }
}
