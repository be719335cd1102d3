//! Prog Types
//!
//! The value model shared by the prog compiler and runtime:
//!
//! - [`BaseType`] - the domain category of a value
//! - [`TypeDescriptor`] - a base type plus container/literal modifiers
//! - [`Value`] - an immutable, typed runtime value
//! - [`NativeValue`] and [`marshal`] - the boundary with the host simulation

pub mod base;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod native;
pub mod time;
pub mod value;

pub use base::{BaseType, PayloadKind};
pub use descriptor::{Container, Modifiers, TypeDescriptor};
pub use entity::EntityRef;
pub use error::TypeError;
pub use native::{NativeValue, marshal};
pub use time::{CalendarTime, TimeSpan};
pub use value::{Payload, Value};
