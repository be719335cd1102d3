//! Entity references
//!
//! Progs never own game objects; they hold opaque handles that the host maps
//! back to its own representation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::base::BaseType;

/// Handle to a host-owned entity: its concrete category and identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub category: BaseType,
    pub id: u64,
}

impl EntityRef {
    pub fn new(category: BaseType, id: u64) -> Self {
        Self { category, id }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.category, self.id)
    }
}
