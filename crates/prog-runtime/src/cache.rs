//! Memoized results of fully-static progs.

use std::collections::HashMap;

use prog_compiler::ProgId;
use prog_types::Value;

/// Return values of fully-static progs, keyed by prog identity only.
///
/// Arguments are not part of the key: once a fully-static prog has produced
/// a value, every later call gets that value until the prog is recompiled.
#[derive(Debug, Default)]
pub struct StaticResultCache {
    values: HashMap<ProgId, Value>,
}

impl StaticResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, prog: ProgId) -> Option<&Value> {
        self.values.get(&prog)
    }

    pub fn store(&mut self, prog: ProgId, value: Value) {
        self.values.insert(prog, value);
    }

    /// Forget the cached value of `prog`. Returns whether one was cached.
    pub fn invalidate(&mut self, prog: ProgId) -> bool {
        self.values.remove(&prog).is_some()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
