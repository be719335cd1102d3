//! Composable type descriptors
//!
//! A [`TypeDescriptor`] is a base category plus a small set of modifier bits.
//! Exactly one base category is always present; at most one container
//! modifier (sequence, mapping, multi-mapping) may be set, and the literal
//! qualifier can be combined with any of them.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::base::BaseType;
use crate::error::TypeError;

/// Modifier bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SEQUENCE: Modifiers = Modifiers(1 << 0);
    pub const MAPPING: Modifiers = Modifiers(1 << 1);
    pub const MULTI_MAPPING: Modifiers = Modifiers(1 << 2);
    pub const LITERAL: Modifiers = Modifiers(1 << 3);

    const CONTAINER_MASK: u8 = 0b0111;

    /// Raw bits.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// True if every bit of `other` is set in `self`.
    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    fn without(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 & !other.0)
    }

    fn containers(self) -> Modifiers {
        Modifiers(self.0 & Self::CONTAINER_MASK)
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

/// Container shape of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Scalar,
    Sequence,
    Mapping,
    MultiMapping,
}

impl Container {
    fn modifier(self) -> Modifiers {
        match self {
            Container::Scalar => Modifiers::NONE,
            Container::Sequence => Modifiers::SEQUENCE,
            Container::Mapping => Modifiers::MAPPING,
            Container::MultiMapping => Modifiers::MULTI_MAPPING,
        }
    }

    fn keyword(self) -> Option<&'static str> {
        match self {
            Container::Scalar => None,
            Container::Sequence => Some("sequence"),
            Container::Mapping => Some("mapping"),
            Container::MultiMapping => Some("multi-mapping"),
        }
    }
}

/// A base type plus modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeDescriptor {
    base: BaseType,
    modifiers: Modifiers,
}

impl TypeDescriptor {
    pub const VOID: TypeDescriptor = TypeDescriptor::scalar(BaseType::Void);
    pub const TEXT: TypeDescriptor = TypeDescriptor::scalar(BaseType::Text);
    pub const NUMBER: TypeDescriptor = TypeDescriptor::scalar(BaseType::Number);
    pub const BOOLEAN: TypeDescriptor = TypeDescriptor::scalar(BaseType::Boolean);
    pub const DATETIME: TypeDescriptor = TypeDescriptor::scalar(BaseType::DateTime);
    pub const TIMESPAN: TypeDescriptor = TypeDescriptor::scalar(BaseType::TimeSpan);
    pub const ANYTHING: TypeDescriptor = TypeDescriptor::scalar(BaseType::Anything);

    /// A plain scalar of the given base type.
    pub const fn scalar(base: BaseType) -> Self {
        Self {
            base,
            modifiers: Modifiers::NONE,
        }
    }

    /// A sequence of `base`.
    pub const fn sequence_of(base: BaseType) -> Self {
        Self {
            base,
            modifiers: Modifiers::SEQUENCE,
        }
    }

    /// A mapping from text to `base`.
    pub const fn mapping_of(base: BaseType) -> Self {
        Self {
            base,
            modifiers: Modifiers::MAPPING,
        }
    }

    /// A mapping from text to many `base` values.
    pub const fn multi_mapping_of(base: BaseType) -> Self {
        Self {
            base,
            modifiers: Modifiers::MULTI_MAPPING,
        }
    }

    /// Build a descriptor from a base type and a container shape.
    pub fn with_container(base: BaseType, container: Container) -> Self {
        Self {
            base,
            modifiers: container.modifier(),
        }
    }

    /// Build a descriptor from raw parts, checking the modifier invariant.
    pub fn from_parts(base: BaseType, modifiers: Modifiers) -> Result<Self, TypeError> {
        let containers = modifiers.containers().bits();
        if containers.count_ones() > 1 {
            return Err(TypeError::NestedContainer(format!(
                "{} with modifier bits {:#06b}",
                base, containers
            )));
        }
        if base == BaseType::Void && modifiers != Modifiers::NONE {
            return Err(TypeError::ModifiedVoid);
        }
        Ok(Self { base, modifiers })
    }

    /// The base category.
    pub fn base(&self) -> BaseType {
        self.base
    }

    /// Modifier bits.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Container shape.
    pub fn container(&self) -> Container {
        let m = self.modifiers;
        if m.contains(Modifiers::SEQUENCE) {
            Container::Sequence
        } else if m.contains(Modifiers::MAPPING) {
            Container::Mapping
        } else if m.contains(Modifiers::MULTI_MAPPING) {
            Container::MultiMapping
        } else {
            Container::Scalar
        }
    }

    pub fn is_void(&self) -> bool {
        self.base == BaseType::Void
    }

    pub fn is_scalar(&self) -> bool {
        self.container() == Container::Scalar
    }

    pub fn is_collection(&self) -> bool {
        !self.is_scalar()
    }

    pub fn is_literal(&self) -> bool {
        self.modifiers.contains(Modifiers::LITERAL)
    }

    /// The same descriptor with the literal qualifier set.
    pub fn as_literal(self) -> Self {
        if self.is_void() {
            return self;
        }
        Self {
            base: self.base,
            modifiers: self.modifiers | Modifiers::LITERAL,
        }
    }

    /// The same descriptor with the literal qualifier cleared.
    pub fn without_literal(self) -> Self {
        Self {
            base: self.base,
            modifiers: self.modifiers.without(Modifiers::LITERAL),
        }
    }

    /// Element type of a container (the scalar base type); scalars return themselves.
    pub fn element(&self) -> Self {
        Self::scalar(self.base)
    }

    /// Whether a value of type `self` may be used where `expected` is declared.
    ///
    /// Container shapes must match exactly; base types follow reference
    /// covariance. The literal qualifier never affects compatibility.
    pub fn compatible_with(&self, expected: &TypeDescriptor) -> bool {
        self.modifiers.containers() == expected.modifiers.containers()
            && expected.base.accepts(self.base)
    }

    /// Parse a human-readable type name such as `number`, `character sequence`
    /// or `text multi-mapping`.
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| w.to_ascii_lowercase())
            .collect();
        let Some((first, rest)) = words.split_first() else {
            return Err(TypeError::EmptyTypeName);
        };

        let base =
            BaseType::from_name(first).ok_or_else(|| TypeError::UnknownType(first.clone()))?;

        let mut modifiers = Modifiers::NONE;
        for word in rest {
            let modifier = match word.as_str() {
                "sequence" | "collection" => Modifiers::SEQUENCE,
                "mapping" | "dictionary" => Modifiers::MAPPING,
                "multi-mapping" | "multimapping" | "collectiondictionary" => {
                    Modifiers::MULTI_MAPPING
                }
                "literal" => Modifiers::LITERAL,
                other => return Err(TypeError::UnknownModifier(other.to_string())),
            };
            if modifiers.contains(modifier) {
                return Err(TypeError::UnknownModifier(format!("duplicate '{}'", word)));
            }
            modifiers = modifiers | modifier;
        }

        Self::from_parts(base, modifiers).map_err(|err| match err {
            TypeError::NestedContainer(_) => TypeError::NestedContainer(text.trim().to_string()),
            other => other,
        })
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if let Some(keyword) = self.container().keyword() {
            write!(f, " {}", keyword)?;
        }
        if self.is_literal() {
            write!(f, " literal")?;
        }
        Ok(())
    }
}

impl FromStr for TypeDescriptor {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TypeDescriptor {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TypeDescriptor> for String {
    fn from(value: TypeDescriptor) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_and_containers() {
        assert_eq!(TypeDescriptor::parse("number").unwrap(), TypeDescriptor::NUMBER);
        assert_eq!(
            TypeDescriptor::parse("Character Sequence").unwrap(),
            TypeDescriptor::sequence_of(BaseType::Character)
        );
        assert_eq!(
            TypeDescriptor::parse("text multi-mapping").unwrap(),
            TypeDescriptor::multi_mapping_of(BaseType::Text)
        );
        assert_eq!(
            TypeDescriptor::parse("item dictionary").unwrap(),
            TypeDescriptor::mapping_of(BaseType::Item)
        );
    }

    #[test]
    fn test_parse_rejects_nested_containers() {
        assert!(matches!(
            TypeDescriptor::parse("number sequence mapping"),
            Err(TypeError::NestedContainer(_))
        ));
        assert!(matches!(
            TypeDescriptor::parse("void sequence"),
            Err(TypeError::ModifiedVoid)
        ));
        assert!(matches!(
            TypeDescriptor::parse("number bag"),
            Err(TypeError::UnknownModifier(_))
        ));
        assert!(matches!(TypeDescriptor::parse("   "), Err(TypeError::EmptyTypeName)));
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["number", "character sequence", "text mapping literal", "item multi-mapping"] {
            let parsed = TypeDescriptor::parse(text).unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn test_compatibility() {
        let perceiver_seq = TypeDescriptor::sequence_of(BaseType::Perceiver);
        let character_seq = TypeDescriptor::sequence_of(BaseType::Character);
        assert!(character_seq.compatible_with(&perceiver_seq));
        assert!(!perceiver_seq.compatible_with(&character_seq));
        assert!(!TypeDescriptor::scalar(BaseType::Character).compatible_with(&perceiver_seq));
        assert!(TypeDescriptor::TEXT.as_literal().compatible_with(&TypeDescriptor::TEXT));
        assert!(TypeDescriptor::TEXT.compatible_with(&TypeDescriptor::TEXT.as_literal()));
    }

    #[test]
    fn test_serde_as_string() {
        let ty = TypeDescriptor::mapping_of(BaseType::Number);
        let json = serde_json::to_string(&ty).unwrap();
        assert_eq!(json, "\"number mapping\"");
        let back: TypeDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ty);
    }
}
