use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use mbi_schema::SchemaRegistry;
use mbi_store::ObjectStore;
use mbi_types::{MetadataObject, ObjectType, PreheatIdentifier, Uid};
use tracing::{debug, info};

use crate::attribute::AttributeDefinition;
use crate::connect::collect_references;
use crate::error::PreheatResult;
use crate::preheat::{unique_key, Preheat};

/// Builds the [`Preheat`] for one bundle.
pub struct PreheatService<'a> {
    store: &'a dyn ObjectStore,
    registry: &'a SchemaRegistry,
}

impl<'a> PreheatService<'a> {
    pub fn new(store: &'a dyn ObjectStore, registry: &'a SchemaRegistry) -> Self {
        Self { store, registry }
    }

    /// Build the index for `objects` and assign UIDs.
    ///
    /// Every submitted object that matches a stored object by `identifier`
    /// adopts the stored UID; any other object without a UID receives a
    /// generated one. Pure read against the store.
    pub fn preheat(
        &self,
        identifier: PreheatIdentifier,
        objects: &mut BTreeMap<ObjectType, Vec<MetadataObject>>,
    ) -> PreheatResult<Preheat> {
        let start = Instant::now();
        let mut preheat = Preheat::new(identifier);

        for abstract_type in self.abstract_types() {
            for member in self.registry.concrete_types(&abstract_type) {
                preheat.add_member(abstract_type.clone(), member);
            }
        }

        self.resolve_payload(&mut preheat, identifier, objects)?;
        self.load_defaults(&mut preheat)?;
        assign_uids(&preheat, objects);

        let mut stored_by_type = BTreeMap::new();
        for object_type in objects.keys() {
            if self.registry.contains(object_type) {
                stored_by_type.insert(object_type.clone(), self.store.list(object_type)?);
            }
        }
        self.build_uniqueness_map(&mut preheat, &stored_by_type);
        self.load_attributes(&mut preheat, objects, &stored_by_type)?;

        for object in objects.values().flatten() {
            preheat.put(object.clone(), false);
        }

        info!(
            identifier = %identifier,
            indexed = preheat.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "preheat complete"
        );
        Ok(preheat)
    }

    fn abstract_types(&self) -> BTreeSet<ObjectType> {
        self.registry
            .create_order()
            .iter()
            .filter_map(|t| self.registry.get(t))
            .flat_map(|s| s.parents.iter().cloned())
            .collect()
    }

    /// Resolve the submitted objects and everything they reference, in one
    /// batch per concrete type.
    fn resolve_payload(
        &self,
        preheat: &mut Preheat,
        identifier: PreheatIdentifier,
        objects: &BTreeMap<ObjectType, Vec<MetadataObject>>,
    ) -> PreheatResult<()> {
        let mut wanted: BTreeMap<ObjectType, BTreeSet<String>> = BTreeMap::new();

        for (object_type, list) in objects {
            for object in list {
                if let Some(value) = identifier.identifier_of(object) {
                    wanted.entry(object_type.clone()).or_default().insert(value.to_string());
                }
                for (target, reference) in collect_references(self.registry, object) {
                    let Some(value) = reference.identifier(identifier) else {
                        continue;
                    };
                    for concrete in self.registry.concrete_types(&target) {
                        wanted.entry(concrete).or_default().insert(value.to_string());
                    }
                }
            }
        }

        for (object_type, values) in wanted {
            let values: Vec<String> = values.into_iter().collect();
            let found = self.store.resolve_all(&object_type, identifier, &values)?;
            debug!(
                object_type = %object_type,
                requested = values.len(),
                found = found.len(),
                "resolved references"
            );
            for object in found {
                preheat.put(object, true);
            }
        }
        Ok(())
    }

    fn load_defaults(&self, preheat: &mut Preheat) -> PreheatResult<()> {
        for object_type in self.registry.create_order() {
            let Some(default_uid) = self.registry.default_uid(object_type) else {
                continue;
            };
            if let Some(default) =
                self.store
                    .resolve(object_type, PreheatIdentifier::Uid, default_uid.as_str())?
            {
                preheat.put(default.clone(), true);
                preheat.set_default(default);
            }
        }
        Ok(())
    }

    /// Seed the uniqueness map with the unique property values already in
    /// the store.
    fn build_uniqueness_map(
        &self,
        preheat: &mut Preheat,
        stored_by_type: &BTreeMap<ObjectType, Vec<MetadataObject>>,
    ) {
        for (object_type, stored) in stored_by_type {
            let Some(schema) = self.registry.get(object_type) else {
                continue;
            };
            for property in schema.unique_properties() {
                for object in stored {
                    let (Some(uid), Some(value)) =
                        (&object.uid, unique_key(&object.value(&property.name)))
                    else {
                        continue;
                    };
                    preheat.claim_unique(object_type, &property.name, value, uid.clone());
                }
            }
        }
    }

    /// Collect attribute definitions from the store and the payload (payload
    /// wins), then seed the unique attribute value map from stored objects.
    fn load_attributes(
        &self,
        preheat: &mut Preheat,
        objects: &BTreeMap<ObjectType, Vec<MetadataObject>>,
        stored_by_type: &BTreeMap<ObjectType, Vec<MetadataObject>>,
    ) -> PreheatResult<()> {
        let attribute_type = ObjectType::attribute();
        let mut definitions: BTreeMap<Uid, AttributeDefinition> = BTreeMap::new();

        let stored = match stored_by_type.get(&attribute_type) {
            Some(stored) => stored.clone(),
            None => self.store.list(&attribute_type)?,
        };
        let submitted = objects.get(&attribute_type).into_iter().flatten();
        for object in stored.iter().chain(submitted) {
            if let Some(definition) = AttributeDefinition::from_object(object) {
                definitions.insert(definition.uid.clone(), definition);
            }
        }
        for definition in definitions.into_values() {
            preheat.add_attribute(definition);
        }

        for (object_type, stored) in stored_by_type {
            let unique: Vec<Uid> = preheat.unique_attributes(object_type).cloned().collect();
            if unique.is_empty() {
                continue;
            }
            for object in stored {
                let Some(owner) = &object.uid else {
                    continue;
                };
                for value in &object.attribute_values {
                    if unique.contains(&value.attribute) && !value.value.is_empty() {
                        preheat.claim_attribute(object_type, &value.attribute, value.value.clone(), owner.clone());
                    }
                }
            }
        }
        Ok(())
    }
}

/// Adopt stored UIDs for matched objects and generate UIDs for new ones.
fn assign_uids(preheat: &Preheat, objects: &mut BTreeMap<ObjectType, Vec<MetadataObject>>) {
    for object in objects.values_mut().flatten() {
        match preheat.get_persisted(object).and_then(|stored| stored.uid.clone()) {
            Some(uid) => object.uid = Some(uid),
            None if object.uid.is_none() => object.uid = Some(Uid::generate()),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbi_schema::{Property, Schema};
    use mbi_store::InMemoryObjectStore;
    use mbi_types::ObjectRef;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builder()
            .register(Schema::attribute())
            .register(Schema::new("categoryCombo").with_default("bjDvmb4bfuf"))
            .register(
                Schema::new("dataElement")
                    .with_property(Property::text("name").unique())
                    .with_property(Property::text("code").unique())
                    .with_property(Property::reference("categoryCombo", "categoryCombo")),
            )
            .build()
            .unwrap()
    }

    fn store() -> InMemoryObjectStore {
        InMemoryObjectStore::with_objects([
            MetadataObject::new("categoryCombo").with_uid("bjDvmb4bfuf").with_name("default"),
            MetadataObject::new("categoryCombo").with_uid("CatCombo001").with_name("Sex"),
            MetadataObject::new("dataElement")
                .with_uid("StoredDE001")
                .with_code("DE_STORED")
                .with_name("Stored")
                .with_attribute_value("AttrUnique1", "taken"),
            MetadataObject::new("attribute")
                .with_uid("AttrUnique1")
                .with_name("External id")
                .with_property("unique", true)
                .with_property("objectTypes", json!(["dataElement"])),
        ])
    }

    fn payload(objects: Vec<MetadataObject>) -> BTreeMap<ObjectType, Vec<MetadataObject>> {
        let mut map: BTreeMap<ObjectType, Vec<MetadataObject>> = BTreeMap::new();
        for object in objects {
            map.entry(object.object_type.clone()).or_default().push(object);
        }
        map
    }

    #[test]
    fn resolves_objects_and_references() {
        let store = store();
        let registry = registry();
        let mut objects = payload(vec![MetadataObject::new("dataElement")
            .with_uid("StoredDE001")
            .with_reference("categoryCombo", ObjectRef::by_uid("CatCombo001"))]);

        let preheat = PreheatService::new(&store, &registry)
            .preheat(PreheatIdentifier::Uid, &mut objects)
            .unwrap();

        let ty = ObjectType::new("dataElement");
        assert!(preheat.get_by_identifier(&ty, "StoredDE001").unwrap().persisted);
        assert!(preheat
            .lookup(&ObjectType::new("categoryCombo"), &ObjectRef::by_uid("CatCombo001"))
            .is_some());
        assert!(preheat.default_for(&ObjectType::new("categoryCombo")).is_some());
    }

    #[test]
    fn assigns_uids_by_code_and_generates_new_ones() {
        let store = store();
        let registry = registry();
        let mut objects = payload(vec![
            MetadataObject::new("dataElement").with_code("DE_STORED"),
            MetadataObject::new("dataElement").with_code("DE_NEW"),
        ]);

        let preheat = PreheatService::new(&store, &registry)
            .preheat(PreheatIdentifier::Code, &mut objects)
            .unwrap();

        let list = &objects[&ObjectType::new("dataElement")];
        assert_eq!(list[0].uid, Some(Uid::new("StoredDE001")));
        let generated = list[1].uid.clone().unwrap();
        assert!(Uid::is_valid(generated.as_str()));

        let placeholder = preheat.get(&list[1]).unwrap();
        assert!(!placeholder.persisted);
        assert!(preheat.get(&list[0]).unwrap().persisted);
    }

    #[test]
    fn uniqueness_map_holds_stored_values() {
        let store = store();
        let registry = registry();
        let mut objects = payload(vec![MetadataObject::new("dataElement").with_name("New")]);
        let preheat = PreheatService::new(&store, &registry)
            .preheat(PreheatIdentifier::Uid, &mut objects)
            .unwrap();

        let ty = ObjectType::new("dataElement");
        assert_eq!(preheat.unique_owner(&ty, "name", "Stored"), Some(&Uid::new("StoredDE001")));
        assert_eq!(preheat.unique_owner(&ty, "code", "DE_STORED"), Some(&Uid::new("StoredDE001")));
        assert!(preheat.unique_owner(&ty, "name", "New").is_none());
    }

    #[test]
    fn attribute_definitions_from_store_and_payload() {
        let store = store();
        let registry = registry();
        let mut objects = payload(vec![
            MetadataObject::new("dataElement").with_name("New"),
            MetadataObject::new("attribute")
                .with_uid("AttrMandat1")
                .with_name("Classification")
                .with_property("mandatory", true)
                .with_property("objectTypes", json!(["dataElement"])),
        ]);
        let preheat = PreheatService::new(&store, &registry)
            .preheat(PreheatIdentifier::Uid, &mut objects)
            .unwrap();

        let ty = ObjectType::new("dataElement");
        let mandatory: Vec<&Uid> = preheat.mandatory_attributes(&ty).collect();
        assert_eq!(mandatory, vec![&Uid::new("AttrMandat1")]);
        assert!(preheat.is_unique_attribute(&ty, &Uid::new("AttrUnique1")));
        assert_eq!(
            preheat.attribute_owner(&ty, &Uid::new("AttrUnique1"), "taken"),
            Some(&Uid::new("StoredDE001"))
        );
    }
}
