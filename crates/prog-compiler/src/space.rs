//! Compile-time variable space
//!
//! Tracks which names are declared, and with what type, at each point of
//! compilation. Blocks compile against a clone of their parent's space, so
//! anything a block declares disappears when the block closes.

use indexmap::{IndexMap, IndexSet};

use prog_types::TypeDescriptor;

/// Declared names and their types. Names are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct VariableSpace {
    vars: IndexMap<String, TypeDescriptor>,
    /// Names that may be read but not assigned, such as `for` counters.
    read_only: IndexSet<String>,
}

impl VariableSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new name. Fails if it is already visible.
    pub fn declare(&mut self, name: &str, ty: TypeDescriptor) -> Result<(), String> {
        let key = name.to_ascii_lowercase();
        if self.vars.contains_key(&key) {
            return Err(format!("variable '{}' is already declared", name));
        }
        self.vars.insert(key, ty.without_literal());
        Ok(())
    }

    /// Declare a name that statements may read but never assign.
    pub fn declare_read_only(&mut self, name: &str, ty: TypeDescriptor) -> Result<(), String> {
        self.declare(name, ty)?;
        self.read_only.insert(name.to_ascii_lowercase());
        Ok(())
    }

    pub fn is_read_only(&self, name: &str) -> bool {
        self.read_only.contains(&name.to_ascii_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<TypeDescriptor> {
        self.vars.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_names() {
        let mut space = VariableSpace::new();
        space.declare("Target", TypeDescriptor::NUMBER).unwrap();
        assert_eq!(space.get("TARGET"), Some(TypeDescriptor::NUMBER));
        assert!(space.declare("target", TypeDescriptor::TEXT).is_err());
    }

    #[test]
    fn test_clone_scopes_declarations() {
        let mut outer = VariableSpace::new();
        outer.declare("x", TypeDescriptor::NUMBER).unwrap();
        let mut inner = outer.clone();
        inner.declare("y", TypeDescriptor::TEXT).unwrap();
        assert!(inner.contains("x"));
        assert!(!outer.contains("y"));
    }

    #[test]
    fn test_read_only_names() {
        let mut space = VariableSpace::new();
        space.declare_read_only("I", TypeDescriptor::NUMBER).unwrap();
        space.declare("total", TypeDescriptor::NUMBER).unwrap();
        assert!(space.is_read_only("i"));
        assert!(!space.is_read_only("total"));
        assert_eq!(space.get("i"), Some(TypeDescriptor::NUMBER));
    }
}
