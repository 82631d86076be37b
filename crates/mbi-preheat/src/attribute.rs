use std::collections::BTreeSet;

use mbi_types::{MetadataObject, ObjectType, Uid};
use serde_json::Value;

/// A custom attribute definition, read from an object of type `attribute`.
///
/// Definition objects carry `mandatory` and `unique` booleans and an
/// `objectTypes` list naming the types the attribute applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeDefinition {
    pub uid: Uid,
    pub name: String,
    pub mandatory: bool,
    pub unique: bool,
    pub object_types: BTreeSet<ObjectType>,
}

impl AttributeDefinition {
    /// Read a definition. Returns `None` for objects of another type or
    /// without a UID.
    pub fn from_object(object: &MetadataObject) -> Option<Self> {
        if object.object_type != ObjectType::attribute() {
            return None;
        }
        let uid = object.uid.clone()?;
        let flag = |name: &str| object.value(name).as_bool().unwrap_or(false);
        let object_types = match object.value("objectTypes") {
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(ObjectType::new)
                .collect(),
            _ => BTreeSet::new(),
        };
        Some(Self {
            name: object.display_name().unwrap_or_else(|| uid.to_string()),
            uid,
            mandatory: flag("mandatory"),
            unique: flag("unique"),
            object_types,
        })
    }

    pub fn applies_to(&self, object_type: &ObjectType) -> bool {
        self.object_types.contains(object_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_flags_and_types() {
        let object = MetadataObject::new("attribute")
            .with_uid("AttrUid0001")
            .with_name("Classification")
            .with_property("mandatory", true)
            .with_property("objectTypes", json!(["dataElement", "indicator"]));
        let def = AttributeDefinition::from_object(&object).unwrap();
        assert!(def.mandatory);
        assert!(!def.unique);
        assert!(def.applies_to(&ObjectType::new("indicator")));
        assert!(!def.applies_to(&ObjectType::new("dataSet")));
        assert_eq!(def.name, "Classification");
    }

    #[test]
    fn ignores_other_types_and_missing_uid() {
        let not_attribute = MetadataObject::new("dataElement").with_uid("AttrUid0001");
        assert!(AttributeDefinition::from_object(&not_attribute).is_none());
        let no_uid = MetadataObject::new("attribute").with_name("x");
        assert!(AttributeDefinition::from_object(&no_uid).is_none());
    }
}
