use std::collections::BTreeMap;

use crate::object::{MetadataObject, ObjectType};

/// A payload object together with its position in the submitted list for
/// its type. The position is stable for the lifetime of the bundle and is
/// what object reports refer to.
#[derive(Clone, Debug, PartialEq)]
pub struct BundleObject {
    pub index: usize,
    pub object: MetadataObject,
}

impl BundleObject {
    pub fn new(index: usize, object: MetadataObject) -> Self {
        Self { index, object }
    }
}

/// Objects of one type, split by whether they already exist in the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypeObjects {
    pub persisted: Vec<BundleObject>,
    pub non_persisted: Vec<BundleObject>,
}

impl TypeObjects {
    pub fn slice(&self, persisted: bool) -> &[BundleObject] {
        if persisted {
            &self.persisted
        } else {
            &self.non_persisted
        }
    }

    pub fn slice_mut(&mut self, persisted: bool) -> &mut Vec<BundleObject> {
        if persisted {
            &mut self.persisted
        } else {
            &mut self.non_persisted
        }
    }

    pub fn len(&self) -> usize {
        self.persisted.len() + self.non_persisted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persisted.is_empty() && self.non_persisted.is_empty()
    }
}

/// The partitioned payload: object type → persisted / not-yet-persisted
/// objects, each list in submission order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectMap {
    entries: BTreeMap<ObjectType, TypeObjects>,
}

impl ObjectMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object to the persisted or not-yet-persisted list of its type.
    pub fn insert(&mut self, persisted: bool, entry: BundleObject) {
        self.entries
            .entry(entry.object.object_type.clone())
            .or_default()
            .slice_mut(persisted)
            .push(entry);
    }

    /// Types present in the payload, including types whose lists were emptied.
    pub fn types(&self) -> impl Iterator<Item = &ObjectType> {
        self.entries.keys()
    }

    pub fn contains_type(&self, object_type: &ObjectType) -> bool {
        self.entries.contains_key(object_type)
    }

    pub fn get(&self, object_type: &ObjectType) -> Option<&TypeObjects> {
        self.entries.get(object_type)
    }

    pub fn objects(&self, object_type: &ObjectType, persisted: bool) -> &[BundleObject] {
        self.entries
            .get(object_type)
            .map(|t| t.slice(persisted))
            .unwrap_or(&[])
    }

    /// Remove and return one list, leaving it empty.
    pub fn take(&mut self, object_type: &ObjectType, persisted: bool) -> Vec<BundleObject> {
        self.entries
            .get_mut(object_type)
            .map(|t| std::mem::take(t.slice_mut(persisted)))
            .unwrap_or_default()
    }

    /// Put a list back (the counterpart of [`ObjectMap::take`]).
    pub fn put(&mut self, object_type: &ObjectType, persisted: bool, objects: Vec<BundleObject>) {
        *self
            .entries
            .entry(object_type.clone())
            .or_default()
            .slice_mut(persisted) = objects;
    }

    /// All objects of a type in submission order.
    pub fn all_objects(&self, object_type: &ObjectType) -> Vec<&BundleObject> {
        let mut all: Vec<&BundleObject> = match self.entries.get(object_type) {
            Some(t) => t.non_persisted.iter().chain(t.persisted.iter()).collect(),
            None => Vec::new(),
        };
        all.sort_by_key(|entry| entry.index);
        all
    }

    /// Empty every list of every type. Types stay registered.
    pub fn clear_objects(&mut self) {
        for objects in self.entries.values_mut() {
            objects.persisted.clear();
            objects.non_persisted.clear();
        }
    }

    /// Total number of objects across all types.
    pub fn len(&self) -> usize {
        self.entries.values().map(TypeObjects::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(TypeObjects::is_empty)
    }
}
