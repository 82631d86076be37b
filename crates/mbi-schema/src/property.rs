use std::fmt;

use mbi_types::ObjectType;
use serde::{Deserialize, Serialize};

/// Value type of a simple (non-reference) property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Text,
    Integer,
    Number,
    Boolean,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    Date,
    /// Unconstrained JSON.
    Any,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Number => "NUMBER",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::Any => "ANY",
        };
        f.write_str(s)
    }
}

/// Shape of a property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "kind", content = "target")]
pub enum PropertyKind {
    Simple(ValueType),
    /// A single reference to an object of the target type.
    Reference(ObjectType),
    /// A list of references to objects of the target type.
    Collection(ObjectType),
    /// An inline object (or list of inline objects) described by the
    /// target type's schema. Its references count as references of the
    /// owning object.
    Embedded(ObjectType),
}

/// Descriptor of one property of a type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    pub kind: PropertyKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub unique: bool,
    /// Owning side of the association; merge only touches owned properties.
    #[serde(default = "yes")]
    pub owner: bool,
    /// Stored by the persistence layer (as opposed to derived).
    #[serde(default = "yes")]
    pub persisted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

fn yes() -> bool {
    true
}

impl Property {
    fn of_kind(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            unique: false,
            owner: true,
            persisted: true,
            min_length: None,
            max_length: None,
            min: None,
            max: None,
        }
    }

    pub fn simple(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::of_kind(name, PropertyKind::Simple(value_type))
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::simple(name, ValueType::Text)
    }

    pub fn reference(name: impl Into<String>, target: impl Into<ObjectType>) -> Self {
        Self::of_kind(name, PropertyKind::Reference(target.into()))
    }

    pub fn collection(name: impl Into<String>, target: impl Into<ObjectType>) -> Self {
        Self::of_kind(name, PropertyKind::Collection(target.into()))
    }

    pub fn embedded(name: impl Into<String>, target: impl Into<ObjectType>) -> Self {
        Self::of_kind(name, PropertyKind::Embedded(target.into()))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark as the inverse side of an association.
    pub fn inverse(mut self) -> Self {
        self.owner = false;
        self
    }

    /// Mark as derived, never written to the store.
    pub fn transient(mut self) -> Self {
        self.persisted = false;
        self
    }

    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Simple or collection reference.
    pub fn is_reference(&self) -> bool {
        matches!(self.kind, PropertyKind::Reference(_) | PropertyKind::Collection(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, PropertyKind::Collection(_))
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self.kind, PropertyKind::Embedded(_))
    }

    /// Target type of a reference, collection or embedded property.
    pub fn target(&self) -> Option<&ObjectType> {
        match &self.kind {
            PropertyKind::Simple(_) => None,
            PropertyKind::Reference(t) | PropertyKind::Collection(t) | PropertyKind::Embedded(t) => {
                Some(t)
            }
        }
    }

    /// Owned and persisted: the fields an update may overwrite.
    pub fn is_writable(&self) -> bool {
        self.owner && self.persisted
    }
}
