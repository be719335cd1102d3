//! Variable Register
//!
//! Persistent, type-checked key/value state that progs can read and write on
//! game entities. Two layers:
//!
//! - declarations: (category, property) -> declared type and optional default
//! - stored values: (entity, property) -> value
//!
//! Reads fall through stored value -> category default -> empty collection
//! or typed null, so a declared property never reads as "missing".
//! Collections have no defaults; an unset collection reads as empty.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use prog_compiler::RegisterSchema;
use prog_types::{BaseType, EntityRef, TypeDescriptor, Value};

use crate::error::{Result, RuntimeError};

/// A declared register property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    pub category: BaseType,
    pub name: String,
    pub ty: TypeDescriptor,
    pub default: Option<Value>,
}

#[derive(Debug, Default)]
pub struct VariableRegister {
    declarations: IndexMap<(BaseType, String), PropertyDeclaration>,
    values: IndexMap<(EntityRef, String), Value>,
}

fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl VariableRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` for every entity of `category`.
    ///
    /// Fails if the property already exists, the category is a union, or
    /// the default does not fit the type. Collections take no default.
    pub fn register_property(
        &mut self,
        category: BaseType,
        name: &str,
        ty: TypeDescriptor,
        default: Option<Value>,
    ) -> Result<()> {
        if category.is_union() || !category.is_entity() {
            return Err(RuntimeError::UnionCategory(category));
        }
        let k = (category, key(name));
        if self.declarations.contains_key(&k) {
            return Err(RuntimeError::DuplicateProperty {
                category,
                name: name.to_string(),
            });
        }
        let ty = ty.without_literal();
        if ty.is_void() {
            return Err(RuntimeError::InvalidDefault {
                category,
                name: name.to_string(),
                reason: "a property cannot be void".into(),
            });
        }
        if let Some(value) = &default {
            check_default(category, name, ty, value)?;
        }

        debug!(%category, property = name, %ty, "register property declared");
        self.declarations.insert(
            k,
            PropertyDeclaration {
                category,
                name: name.to_string(),
                ty,
                default,
            },
        );
        Ok(())
    }

    pub fn declaration(&self, category: BaseType, name: &str) -> Option<&PropertyDeclaration> {
        self.declarations.get(&(category, key(name)))
    }

    fn declared(&self, category: BaseType, name: &str) -> Result<&PropertyDeclaration> {
        self.declaration(category, name)
            .ok_or_else(|| RuntimeError::UnknownProperty {
                category,
                name: name.to_string(),
            })
    }

    /// Read a property of an entity.
    pub fn get(&self, entity: EntityRef, name: &str) -> Result<Value> {
        let declaration = self.declared(entity.category, name)?;
        if let Some(stored) = self.values.get(&(entity, key(name))) {
            // Values orphaned by a removed declaration are ignored unless
            // they still fit the current one.
            if stored.ty().compatible_with(&declaration.ty) {
                return Ok(stored.clone());
            }
        }
        Ok(match &declaration.default {
            Some(default) => default.clone(),
            None => Value::empty(declaration.ty),
        })
    }

    /// Store a property value. Rejects values of the wrong type, leaving
    /// whatever was stored before untouched.
    pub fn set(&mut self, entity: EntityRef, name: &str, value: Value) -> Result<()> {
        let declaration = self.declared(entity.category, name)?;
        if !value.ty().compatible_with(&declaration.ty) {
            return Err(RuntimeError::TypeMismatch {
                expected: declaration.ty,
                found: value.ty(),
            });
        }
        self.values.insert((entity, key(name)), value);
        Ok(())
    }

    /// Drop a stored value so reads see the default again. Returns whether a
    /// value was stored.
    pub fn reset_to_default(&mut self, entity: EntityRef, name: &str) -> Result<bool> {
        self.declared(entity.category, name)?;
        Ok(self.values.shift_remove(&(entity, key(name))).is_some())
    }

    /// Replace the default of a scalar property.
    pub fn set_default(&mut self, category: BaseType, name: &str, default: Value) -> Result<()> {
        let ty = self.declared(category, name)?.ty;
        check_default(category, name, ty, &default)?;
        if let Some(declaration) = self.declarations.get_mut(&(category, key(name))) {
            declaration.default = Some(default);
        }
        Ok(())
    }

    /// Remove a declaration. Stored values are left in place, orphaned.
    pub fn remove_property(&mut self, category: BaseType, name: &str) -> Option<PropertyDeclaration> {
        self.declarations.shift_remove(&(category, key(name)))
    }

    /// Remove every stored value of `entity`; call when the entity is
    /// destroyed. Returns how many values were removed.
    pub fn purge_entity(&mut self, entity: EntityRef) -> usize {
        let before = self.values.len();
        self.values.retain(|(owner, _), _| *owner != entity);
        let removed = before - self.values.len();
        if removed > 0 {
            debug!(%entity, removed, "register values purged");
        }
        removed
    }

    /// Declarations for `category`, in declaration order.
    pub fn properties(&self, category: BaseType) -> impl Iterator<Item = &PropertyDeclaration> {
        self.declarations
            .values()
            .filter(move |declaration| declaration.category == category)
    }

    pub fn declarations(&self) -> impl Iterator<Item = &PropertyDeclaration> {
        self.declarations.values()
    }

    /// Every stored value, including orphans.
    pub fn stored_values(&self) -> impl Iterator<Item = (EntityRef, &str, &Value)> {
        self.values
            .iter()
            .map(|((entity, name), value)| (*entity, name.as_str(), value))
    }

    /// Put back a stored value without checking it against its declaration.
    /// Used when restoring persisted state, where orphans are legitimate.
    pub fn restore_value(&mut self, entity: EntityRef, name: &str, value: Value) {
        self.values.insert((entity, key(name)), value);
    }
}

fn check_default(category: BaseType, name: &str, ty: TypeDescriptor, value: &Value) -> Result<()> {
    if ty.is_collection() {
        return Err(RuntimeError::InvalidDefault {
            category,
            name: name.to_string(),
            reason: "collection properties have no default".into(),
        });
    }
    if !value.ty().compatible_with(&ty) {
        return Err(RuntimeError::TypeMismatch {
            expected: ty,
            found: value.ty(),
        });
    }
    Ok(())
}

impl RegisterSchema for VariableRegister {
    fn property_type(&self, category: BaseType, property: &str) -> Option<TypeDescriptor> {
        self.declaration(category, property).map(|d| d.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> EntityRef {
        EntityRef::new(BaseType::Character, 1)
    }

    fn register() -> VariableRegister {
        let mut register = VariableRegister::new();
        register
            .register_property(BaseType::Character, "Mood", TypeDescriptor::TEXT, Some(Value::text("calm")))
            .unwrap();
        register
            .register_property(
                BaseType::Character,
                "visits",
                TypeDescriptor::sequence_of(BaseType::Location),
                None,
            )
            .unwrap();
        register
    }

    #[test]
    fn test_fall_through_to_default() {
        let register = register();
        assert_eq!(register.get(alice(), "mood").unwrap(), Value::text("calm"));
    }

    #[test]
    fn test_unset_collection_is_empty() {
        let register = register();
        let visits = register.get(alice(), "visits").unwrap();
        assert!(!visits.is_null());
        assert_eq!(visits.as_sequence().map(<[Value]>::len), Some(0));
    }

    #[test]
    fn test_wrong_type_is_rejected_and_store_unchanged() {
        let mut register = register();
        register.set(alice(), "mood", Value::text("angry")).unwrap();
        assert!(register.set(alice(), "mood", Value::number(3.0)).is_err());
        assert_eq!(register.get(alice(), "mood").unwrap(), Value::text("angry"));

        let bob = EntityRef::new(BaseType::Character, 2);
        assert!(register.set(bob, "visits", Value::text("x")).is_err());
        assert_eq!(register.stored_values().count(), 1);
    }

    #[test]
    fn test_reset_to_default() {
        let mut register = register();
        register.set(alice(), "mood", Value::text("angry")).unwrap();
        assert!(register.reset_to_default(alice(), "mood").unwrap());
        assert_eq!(register.get(alice(), "mood").unwrap(), Value::text("calm"));
        assert!(!register.reset_to_default(alice(), "mood").unwrap());
    }

    #[test]
    fn test_registration_rules() {
        let mut register = register();
        assert!(matches!(
            register.register_property(BaseType::Character, "MOOD", TypeDescriptor::TEXT, None),
            Err(RuntimeError::DuplicateProperty { .. })
        ));
        assert!(matches!(
            register.register_property(BaseType::Perceiver, "x", TypeDescriptor::TEXT, None),
            Err(RuntimeError::UnionCategory(_))
        ));
        assert!(register
            .register_property(
                BaseType::Item,
                "tags",
                TypeDescriptor::sequence_of(BaseType::Text),
                Some(Value::text("a"))
            )
            .is_err());
        assert!(register
            .register_property(BaseType::Item, "weight", TypeDescriptor::NUMBER, Some(Value::text("a")))
            .is_err());
    }

    #[test]
    fn test_unknown_property() {
        let register = register();
        assert!(matches!(
            register.get(EntityRef::new(BaseType::Item, 4), "mood"),
            Err(RuntimeError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_removed_property_orphans_values() {
        let mut register = register();
        register.set(alice(), "mood", Value::text("angry")).unwrap();
        register.remove_property(BaseType::Character, "mood");
        assert!(register.get(alice(), "mood").is_err());
        assert_eq!(register.stored_values().count(), 1);

        register
            .register_property(BaseType::Character, "mood", TypeDescriptor::NUMBER, Some(Value::number(0.0)))
            .unwrap();
        assert_eq!(register.get(alice(), "mood").unwrap(), Value::number(0.0));
    }

    #[test]
    fn test_purge_entity() {
        let mut register = register();
        let bob = EntityRef::new(BaseType::Character, 2);
        register.set(alice(), "mood", Value::text("angry")).unwrap();
        register.set(bob, "mood", Value::text("sad")).unwrap();
        assert_eq!(register.purge_entity(alice()), 1);
        assert_eq!(register.get(alice(), "mood").unwrap(), Value::text("calm"));
        assert_eq!(register.get(bob, "mood").unwrap(), Value::text("sad"));
    }

    #[test]
    fn test_schema_and_listing() {
        let register = register();
        assert_eq!(
            register.property_type(BaseType::Character, "MOOD"),
            Some(TypeDescriptor::TEXT)
        );
        assert_eq!(register.properties(BaseType::Character).count(), 2);
        assert_eq!(register.properties(BaseType::Item).count(), 0);
    }
}
