use mbi_types::{MetadataObject, ObjectType, Uid};
use serde::{Deserialize, Serialize};

use crate::property::{Property, ValueType};

/// Static description of one object type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub object_type: ObjectType,
    pub properties: Vec<Property>,
    /// UID of the type's built-in default instance, if it has one. References
    /// to the default are never dangling, and a null reference to this type
    /// is connected to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_uid: Option<Uid>,
    /// Whether objects of this type carry sharing settings.
    #[serde(default)]
    pub shareable: bool,
    /// Abstract types this type can stand in for (hook targets and
    /// polymorphic reference targets).
    #[serde(default)]
    pub parents: Vec<ObjectType>,
}

impl Schema {
    pub fn new(object_type: impl Into<ObjectType>) -> Self {
        Self {
            object_type: object_type.into(),
            properties: Vec::new(),
            default_uid: None,
            shareable: false,
            parents: Vec::new(),
        }
    }

    /// Schema of the built-in `attribute` type, whose objects define custom
    /// attributes for other types.
    pub fn attribute() -> Self {
        Self::new(ObjectType::attribute())
            .with_property(Property::text("name").required().unique())
            .with_property(Property::text("code").unique())
            .with_property(Property::text("valueType"))
            .with_property(Property::simple("mandatory", ValueType::Boolean))
            .with_property(Property::simple("unique", ValueType::Boolean))
            .with_property(Property::simple("objectTypes", ValueType::Any))
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_default(mut self, uid: impl Into<Uid>) -> Self {
        self.default_uid = Some(uid.into());
        self
    }

    pub fn shareable(mut self) -> Self {
        self.shareable = true;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<ObjectType>) -> Self {
        self.parents.push(parent.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn unique_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| p.unique && p.persisted)
    }

    /// Simple and collection reference properties.
    pub fn reference_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| p.is_reference() && p.persisted)
    }

    pub fn embedded_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| p.is_embedded() && p.persisted)
    }

    /// Properties an update may overwrite.
    pub fn writable_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| p.is_writable())
    }

    /// Returns `true` if `object` is this type's default instance.
    pub fn is_default(&self, object: &MetadataObject) -> bool {
        match (&self.default_uid, &object.uid) {
            (Some(default), Some(uid)) => default == uid,
            _ => false,
        }
    }
}
