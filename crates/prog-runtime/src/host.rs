//! The host simulation as seen by built-in functions.

use tracing::info;

use prog_types::{CalendarTime, EntityRef};

/// Access to the surrounding simulation during a prog call.
pub trait Host {
    /// Current in-world time.
    fn now(&self) -> CalendarTime {
        CalendarTime::EPOCH
    }

    /// Deliver text to an entity.
    fn output(&mut self, target: EntityRef, text: &str) {
        info!(entity = %target, text, "prog output");
    }
}

/// A host with no simulation behind it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl Host for NullHost {}
