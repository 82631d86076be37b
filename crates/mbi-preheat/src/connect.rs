use std::collections::BTreeMap;

use mbi_schema::{PropertyKind, Schema, SchemaRegistry};
use mbi_types::{MetadataObject, ObjectRef, ObjectType};
use serde_json::{Map, Value};

use crate::preheat::Preheat;

/// A reference that matched neither an indexed object nor a default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// Property path, `outer.inner` for references inside embedded objects.
    pub property: String,
    pub target: ObjectType,
    pub reference: ObjectRef,
}

/// Field access shared by top-level objects and embedded JSON objects.
trait Fields {
    fn field(&self, name: &str) -> Option<&Value>;
    fn field_mut(&mut self, name: &str) -> Option<&mut Value>;
    fn set_field(&mut self, name: &str, value: Value);
}

impl Fields for BTreeMap<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.get_mut(name)
    }

    fn set_field(&mut self, name: &str, value: Value) {
        self.insert(name.to_string(), value);
    }
}

impl Fields for Map<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.get_mut(name)
    }

    fn set_field(&mut self, name: &str, value: Value) {
        self.insert(name.to_string(), value);
    }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// Every `(target type, reference)` pair reachable from `object`, including
/// references held by embedded objects. Objects of unregistered types have
/// none.
pub fn collect_references(registry: &SchemaRegistry, object: &MetadataObject) -> Vec<(ObjectType, ObjectRef)> {
    let mut found = Vec::new();
    if let Some(schema) = registry.get(&object.object_type) {
        collect_fields(registry, schema, &object.properties, &mut found);
    }
    found
}

fn collect_fields<F: Fields>(
    registry: &SchemaRegistry,
    schema: &Schema,
    fields: &F,
    found: &mut Vec<(ObjectType, ObjectRef)>,
) {
    for property in schema.properties.iter().filter(|p| p.persisted) {
        let Some(value) = fields.field(&property.name) else {
            continue;
        };
        match &property.kind {
            PropertyKind::Simple(_) => {}
            PropertyKind::Reference(target) => {
                if let Some(reference) = ObjectRef::from_value(value) {
                    found.push((target.clone(), reference));
                }
            }
            PropertyKind::Collection(target) => {
                if let Value::Array(items) = value {
                    found.extend(
                        items
                            .iter()
                            .filter_map(ObjectRef::from_value)
                            .map(|r| (target.clone(), r)),
                    );
                }
            }
            PropertyKind::Embedded(target) => {
                let Some(inner) = registry.get(target) else {
                    continue;
                };
                match value {
                    Value::Object(map) => collect_fields(registry, inner, map, found),
                    Value::Array(items) => {
                        for map in items.iter().filter_map(Value::as_object) {
                            collect_fields(registry, inner, map, found);
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

/// Rewrite every reference of `object` to point at the indexed instance.
///
/// - a resolved reference is replaced by the instance's full identifiers
/// - a null or missing single reference is connected to the target type's
///   default instance, if it has one
/// - a reference to a default instance is always accepted
/// - an unresolved single reference is set to null; unresolved collection
///   entries are dropped
///
/// Returns the references that could not be resolved.
pub fn connect_references(
    preheat: &Preheat,
    registry: &SchemaRegistry,
    object: &mut MetadataObject,
) -> Vec<UnresolvedReference> {
    let mut unresolved = Vec::new();
    if let Some(schema) = registry.get(&object.object_type) {
        connect_fields(preheat, registry, schema, &mut object.properties, "", &mut unresolved);
    }
    unresolved
}

fn resolve(preheat: &Preheat, target: &ObjectType, reference: &ObjectRef) -> Option<ObjectRef> {
    preheat
        .lookup(target, reference)
        .or_else(|| preheat.default_reference(target, reference))
        .map(ObjectRef::of)
}

fn connect_fields<F: Fields>(
    preheat: &Preheat,
    registry: &SchemaRegistry,
    schema: &Schema,
    fields: &mut F,
    prefix: &str,
    unresolved: &mut Vec<UnresolvedReference>,
) {
    for property in schema.properties.iter().filter(|p| p.persisted) {
        let name = property.name.as_str();
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };

        match &property.kind {
            PropertyKind::Simple(_) => {}
            PropertyKind::Reference(target) => {
                let current = fields.field(name).and_then(ObjectRef::from_value);
                let connected = match current {
                    None => preheat.default_for(target).map(ObjectRef::of),
                    Some(reference) => {
                        let resolved = resolve(preheat, target, &reference);
                        if resolved.is_none() {
                            unresolved.push(UnresolvedReference {
                                property: path,
                                target: target.clone(),
                                reference,
                            });
                        }
                        resolved
                    }
                };
                match connected {
                    Some(reference) => fields.set_field(name, reference.to_value()),
                    None if fields.field(name).is_some() => fields.set_field(name, Value::Null),
                    None => {}
                }
            }
            PropertyKind::Collection(target) => {
                let Some(Value::Array(items)) = fields.field(name) else {
                    continue;
                };
                let mut connected = Vec::with_capacity(items.len());
                for reference in items.iter().filter_map(ObjectRef::from_value) {
                    match resolve(preheat, target, &reference) {
                        Some(resolved) => connected.push(resolved.to_value()),
                        None => unresolved.push(UnresolvedReference {
                            property: path.clone(),
                            target: target.clone(),
                            reference,
                        }),
                    }
                }
                fields.set_field(name, Value::Array(connected));
            }
            PropertyKind::Embedded(target) => {
                let Some(inner) = registry.get(target) else {
                    continue;
                };
                match fields.field_mut(name) {
                    Some(Value::Object(map)) => {
                        connect_fields(preheat, registry, inner, map, &path, unresolved)
                    }
                    Some(Value::Array(items)) => {
                        for map in items.iter_mut().filter_map(Value::as_object_mut) {
                            connect_fields(preheat, registry, inner, map, &path, unresolved);
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}
