//! Base type categories
//!
//! Every value a prog handles belongs to exactly one base category. Most
//! categories are references to domain entities owned by the host simulation;
//! a handful are plain scalars, and a few are unions used for covariant
//! parameter declarations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the payload of a base category is represented at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// No payload at all (`void`)
    Nothing,
    /// UTF-8 text
    Text,
    /// Floating-point number
    Number,
    /// True or false
    Boolean,
    /// Calendar timestamp
    DateTime,
    /// Calendar duration
    TimeSpan,
    /// Reference to a host entity
    Entity,
    /// Decided by the concrete value (union categories)
    Dynamic,
}

macro_rules! base_types {
    ($( $variant:ident => $name:literal, $payload:ident; )*) => {
        /// A base type category.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum BaseType {
            $( $variant, )*
        }

        impl BaseType {
            /// Every base type, in declaration order.
            pub const ALL: &'static [BaseType] = &[ $( BaseType::$variant, )* ];

            /// Canonical lower-case name used in source text.
            pub fn name(self) -> &'static str {
                match self {
                    $( BaseType::$variant => $name, )*
                }
            }

            /// Runtime payload representation.
            pub fn payload_kind(self) -> PayloadKind {
                match self {
                    $( BaseType::$variant => PayloadKind::$payload, )*
                }
            }
        }
    };
}

base_types! {
    Void => "void", Nothing;
    Text => "text", Text;
    Number => "number", Number;
    Boolean => "boolean", Boolean;
    Gender => "gender", Text;
    DateTime => "datetime", DateTime;
    TimeSpan => "timespan", TimeSpan;
    Character => "character", Entity;
    Item => "item", Entity;
    Location => "location", Entity;
    Zone => "zone", Entity;
    Shard => "shard", Entity;
    Exit => "exit", Entity;
    Area => "area", Entity;
    Terrain => "terrain", Entity;
    Chargen => "chargen", Entity;
    Race => "race", Entity;
    Culture => "culture", Entity;
    Ethnicity => "ethnicity", Entity;
    Trait => "trait", Entity;
    Merit => "merit", Entity;
    Knowledge => "knowledge", Entity;
    Role => "role", Entity;
    Language => "language", Entity;
    Accent => "accent", Entity;
    Effect => "effect", Entity;
    Clan => "clan", Entity;
    ClanRank => "clanrank", Entity;
    ClanAppointment => "clanappointment", Entity;
    Currency => "currency", Entity;
    Shop => "shop", Entity;
    Merchandise => "merchandise", Entity;
    Bank => "bank", Entity;
    BankAccount => "bankaccount", Entity;
    Market => "market", Entity;
    LegalAuthority => "legalauthority", Entity;
    Crime => "crime", Entity;
    Project => "project", Entity;
    Outfit => "outfit", Entity;
    Drug => "drug", Entity;
    Liquid => "liquid", Entity;
    Solid => "solid", Entity;
    Gas => "gas", Entity;
    WeatherEvent => "weatherevent", Entity;
    Calendar => "calendar", Entity;
    Clock => "clock", Entity;
    MagicSchool => "magicschool", Entity;
    MagicSpell => "magicspell", Entity;
    Tag => "tag", Entity;
    Writing => "writing", Entity;
    Perceiver => "perceiver", Dynamic;
    Perceivable => "perceivable", Dynamic;
    Toon => "toon", Dynamic;
    Reference => "reference", Dynamic;
    Anything => "anything", Dynamic;
}

impl BaseType {
    /// Resolve a base type from its name or one of its aliases (case-insensitive).
    pub fn from_name(name: &str) -> Option<BaseType> {
        let lower = name.trim().to_ascii_lowercase();
        let alias = match lower.as_str() {
            "string" | "str" => Some(BaseType::Text),
            "bool" => Some(BaseType::Boolean),
            "decimal" | "int" | "integer" => Some(BaseType::Number),
            "char" | "ch" => Some(BaseType::Character),
            "room" => Some(BaseType::Location),
            "mudtime" | "muddatetime" => Some(BaseType::DateTime),
            "duration" => Some(BaseType::TimeSpan),
            "perceivables" => Some(BaseType::Perceivable),
            "referencetype" => Some(BaseType::Reference),
            "any" => Some(BaseType::Anything),
            _ => None,
        };
        alias.or_else(|| BaseType::ALL.iter().copied().find(|b| b.name() == lower))
    }

    /// Whether this category refers to a host-owned entity.
    pub fn is_entity(self) -> bool {
        self.payload_kind() == PayloadKind::Entity
    }

    /// Whether this category is a union over other categories.
    pub fn is_union(self) -> bool {
        self.payload_kind() == PayloadKind::Dynamic
    }

    /// Covariance: can a value of category `actual` be used where `self` is expected?
    pub fn accepts(self, actual: BaseType) -> bool {
        if self == actual {
            return true;
        }
        use BaseType::*;
        match self {
            Anything => actual != Void,
            Reference => actual.is_entity() || matches!(actual, Perceiver | Perceivable | Toon),
            Perceivable => matches!(
                actual,
                Character | Item | Location | Zone | Shard | Exit | Perceiver
            ),
            Perceiver => matches!(actual, Character | Item),
            Toon => matches!(actual, Character | Chargen),
            _ => false,
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
