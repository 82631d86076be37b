use mbi_schema::Schema;
use mbi_types::{MergeMode, MetadataObject};

/// Fold `incoming` into `stored` according to `mode`.
///
/// Only writable (owned, persisted) properties of the schema are touched.
/// `code` and `name` are treated as writable even when the schema does not
/// declare them. The UID, owner and sharing of `stored` are left alone.
///
/// - [`MergeMode::Replace`] copies every writable field, nulls included.
/// - [`MergeMode::Merge`] copies only fields that are present and non-null
///   in `incoming`.
/// - [`MergeMode::None`] leaves `stored` untouched.
pub fn merge_objects(stored: &mut MetadataObject, incoming: &MetadataObject, schema: &Schema, mode: MergeMode) {
    if mode == MergeMode::None {
        return;
    }

    let mut names: Vec<&str> = schema.writable_properties().map(|p| p.name.as_str()).collect();
    for identity in ["code", "name"] {
        if schema.property(identity).is_none() {
            names.push(identity);
        }
    }

    for name in names {
        let value = incoming.value(name);
        if mode == MergeMode::Replace || !value.is_null() {
            stored.set_value(name, value);
        }
    }

    match mode {
        MergeMode::Replace => stored.attribute_values = incoming.attribute_values.clone(),
        MergeMode::Merge => {
            for value in &incoming.attribute_values {
                match stored
                    .attribute_values
                    .iter_mut()
                    .find(|v| v.attribute == value.attribute)
                {
                    Some(existing) => existing.value = value.value.clone(),
                    None => stored.attribute_values.push(value.clone()),
                }
            }
        }
        MergeMode::None => {}
    }
}

/// Carry sharing settings from `incoming` to `stored`. Settings absent from
/// the incoming object never clear the stored ones.
pub fn merge_sharing(stored: &mut MetadataObject, incoming: &MetadataObject, mode: MergeMode) {
    if mode == MergeMode::None {
        return;
    }
    if let Some(sharing) = &incoming.sharing {
        stored.sharing = Some(sharing.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbi_schema::Property;
    use mbi_types::Sharing;
    use serde_json::{json, Value};

    fn schema() -> Schema {
        Schema::new("dataElement")
            .with_property(Property::simple("a", mbi_schema::ValueType::Integer))
            .with_property(Property::simple("b", mbi_schema::ValueType::Integer))
            .with_property(Property::collection("groups", "dataElementGroup").inverse())
    }

    fn stored() -> MetadataObject {
        MetadataObject::new("dataElement")
            .with_uid("fbfJHSPpUQD")
            .with_name("ANC")
            .with_property("a", 1)
            .with_property("b", 2)
            .with_property("groups", json!([{"id": "Group000001"}]))
            .with_attribute_value("AttrUid0001", "keep")
    }

    fn incoming() -> MetadataObject {
        MetadataObject::new("dataElement")
            .with_uid("fbfJHSPpUQD")
            .with_property("a", Value::Null)
            .with_property("b", 3)
            .with_attribute_value("AttrUid0002", "new")
    }

    #[test]
    fn merge_keeps_stored_values_for_nulls() {
        let mut target = stored();
        merge_objects(&mut target, &incoming(), &schema(), MergeMode::Merge);
        assert_eq!(target.value("a"), json!(1));
        assert_eq!(target.value("b"), json!(3));
        assert_eq!(target.name.as_deref(), Some("ANC"));
        assert_eq!(target.attribute_values.len(), 2);
    }

    #[test]
    fn replace_overwrites_with_nulls() {
        let mut target = stored();
        merge_objects(&mut target, &incoming(), &schema(), MergeMode::Replace);
        assert_eq!(target.value("a"), Value::Null);
        assert_eq!(target.value("b"), json!(3));
        assert_eq!(target.name, None);
        assert_eq!(target.attribute_values, incoming().attribute_values);
    }

    #[test]
    fn inverse_properties_are_never_touched() {
        let mut target = stored();
        merge_objects(&mut target, &incoming(), &schema(), MergeMode::Replace);
        assert_eq!(target.value("groups"), json!([{"id": "Group000001"}]));
    }

    #[test]
    fn none_leaves_object_untouched() {
        let mut target = stored();
        merge_objects(&mut target, &incoming(), &schema(), MergeMode::None);
        assert_eq!(target, stored());
    }

    #[test]
    fn sharing_is_only_overwritten_when_given() {
        let mut target = stored();
        target.sharing = Some(Sharing { public_access: Some("rw------".into()), ..Sharing::default() });

        merge_sharing(&mut target, &incoming(), MergeMode::Replace);
        assert_eq!(target.sharing.as_ref().unwrap().public_access.as_deref(), Some("rw------"));

        let mut with_sharing = incoming();
        with_sharing.sharing = Some(Sharing { public_access: Some("r-------".into()), ..Sharing::default() });
        merge_sharing(&mut target, &with_sharing, MergeMode::Merge);
        assert_eq!(target.sharing.unwrap().public_access.as_deref(), Some("r-------"));
    }
}
