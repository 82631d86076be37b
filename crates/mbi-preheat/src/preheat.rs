use std::collections::{BTreeMap, BTreeSet};

use mbi_types::{MetadataObject, ObjectRef, ObjectType, PreheatIdentifier, Uid};
use serde_json::Value;

use crate::attribute::AttributeDefinition;

/// One indexed object.
#[derive(Clone, Debug, PartialEq)]
pub struct PreheatEntry {
    pub object: MetadataObject,
    /// `false` for placeholders of submitted objects that are not stored yet.
    pub persisted: bool,
}

/// String form of a value for uniqueness tracking. Null and empty strings
/// never take part in uniqueness.
pub fn unique_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Clone, Debug, Default)]
struct TypeIndex {
    by_uid: BTreeMap<Uid, PreheatEntry>,
    code_to_uid: BTreeMap<String, Uid>,
}

impl TypeIndex {
    fn by_code(&self, code: &str) -> Option<&PreheatEntry> {
        self.code_to_uid.get(code).and_then(|uid| self.by_uid.get(uid))
    }

    fn find(&self, identifier: PreheatIdentifier, uid: Option<&str>, code: Option<&str>) -> Option<&PreheatEntry> {
        let by_uid = || uid.and_then(|u| self.by_uid.get(&Uid::new(u)));
        let by_code = || code.and_then(|c| self.by_code(c));
        match identifier {
            PreheatIdentifier::Uid => by_uid(),
            PreheatIdentifier::Code => by_code(),
            PreheatIdentifier::Auto => by_uid().or_else(by_code),
        }
    }

    fn insert(&mut self, uid: Uid, entry: PreheatEntry) {
        if let Some(old) = self.by_uid.get(&uid) {
            if let Some(code) = &old.object.code {
                if self.code_to_uid.get(code) == Some(&uid) {
                    self.code_to_uid.remove(code);
                }
            }
        }
        if let Some(code) = &entry.object.code {
            self.code_to_uid.insert(code.clone(), uid.clone());
        }
        self.by_uid.insert(uid, entry);
    }

    fn remove(&mut self, uid: &Uid) -> Option<PreheatEntry> {
        let entry = self.by_uid.remove(uid)?;
        if let Some(code) = &entry.object.code {
            if self.code_to_uid.get(code) == Some(uid) {
                self.code_to_uid.remove(code);
            }
        }
        Some(entry)
    }
}

/// The reference index built once per bundle.
///
/// Read-mostly: after it is built only the commit path mutates it, through
/// [`Preheat::replace`] and [`Preheat::remove`], plus the uniqueness checks
/// claiming the values they accept.
#[derive(Clone, Debug, Default)]
pub struct Preheat {
    identifier: PreheatIdentifier,
    index: BTreeMap<ObjectType, TypeIndex>,
    /// Abstract type → registered types that stand in for it.
    members: BTreeMap<ObjectType, Vec<ObjectType>>,
    defaults: BTreeMap<ObjectType, MetadataObject>,
    uniqueness: BTreeMap<ObjectType, BTreeMap<String, BTreeMap<String, Uid>>>,
    attribute_values: BTreeMap<ObjectType, BTreeMap<Uid, BTreeMap<String, Uid>>>,
    mandatory_attributes: BTreeMap<ObjectType, BTreeSet<Uid>>,
    unique_attributes: BTreeMap<ObjectType, BTreeSet<Uid>>,
    attributes: BTreeMap<Uid, AttributeDefinition>,
}

impl Preheat {
    pub fn new(identifier: PreheatIdentifier) -> Self {
        Self {
            identifier,
            ..Self::default()
        }
    }

    pub fn identifier(&self) -> PreheatIdentifier {
        self.identifier
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Entry matching `object` by the bundle's identifier strategy.
    pub fn get(&self, object: &MetadataObject) -> Option<&PreheatEntry> {
        let uid = object.uid.as_ref().map(Uid::as_str);
        self.index
            .get(&object.object_type)?
            .find(self.identifier, uid, object.code.as_deref())
    }

    /// Stored instance matching `object`, ignoring placeholders.
    pub fn get_persisted(&self, object: &MetadataObject) -> Option<&MetadataObject> {
        self.get(object).filter(|e| e.persisted).map(|e| &e.object)
    }

    /// Entry for an identifier value of a type, by the bundle's strategy.
    pub fn get_by_identifier(&self, object_type: &ObjectType, value: &str) -> Option<&PreheatEntry> {
        self.index
            .get(object_type)?
            .find(self.identifier, Some(value), Some(value))
    }

    /// Entry for a UID, whatever the identifier strategy.
    pub fn get_by_uid(&self, object_type: &ObjectType, uid: &Uid) -> Option<&PreheatEntry> {
        self.index.get(object_type)?.by_uid.get(uid)
    }

    /// Resolve a reference whose declared target is `target`. Abstract
    /// targets are searched through every registered member type.
    pub fn lookup(&self, target: &ObjectType, reference: &ObjectRef) -> Option<&MetadataObject> {
        let uid = reference.uid.as_ref().map(Uid::as_str);
        let code = reference.code.as_deref();
        std::iter::once(target)
            .chain(self.members.get(target).into_iter().flatten())
            .filter_map(|t| self.index.get(t))
            .find_map(|idx| idx.find(self.identifier, uid, code))
            .map(|e| &e.object)
    }

    pub fn contains(&self, object: &MetadataObject) -> bool {
        self.get(object).is_some()
    }

    /// Number of indexed objects, placeholders included.
    pub fn len(&self) -> usize {
        self.index.values().map(|t| t.by_uid.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Index `object`. A placeholder never shadows a persisted entry; objects
    /// without a UID are not indexed. Returns whether the entry was stored.
    pub fn put(&mut self, object: MetadataObject, persisted: bool) -> bool {
        let Some(uid) = object.uid.clone() else {
            return false;
        };
        let index = self.index.entry(object.object_type.clone()).or_default();
        if !persisted && index.by_uid.get(&uid).is_some_and(|e| e.persisted) {
            return false;
        }
        index.insert(uid, PreheatEntry { object, persisted });
        true
    }

    /// Replace the entry for `object` with the now-persisted instance.
    pub fn replace(&mut self, object: MetadataObject) {
        self.put(object, true);
    }

    pub fn remove(&mut self, object: &MetadataObject) -> Option<PreheatEntry> {
        let uid = object.uid.as_ref()?;
        self.index.get_mut(&object.object_type)?.remove(uid)
    }

    pub fn add_member(&mut self, abstract_type: ObjectType, member: ObjectType) {
        let members = self.members.entry(abstract_type).or_default();
        if !members.contains(&member) {
            members.push(member);
        }
    }

    // -----------------------------------------------------------------------
    // Defaults
    // -----------------------------------------------------------------------

    pub fn set_default(&mut self, object: MetadataObject) {
        self.defaults.insert(object.object_type.clone(), object);
    }

    pub fn default_for(&self, object_type: &ObjectType) -> Option<&MetadataObject> {
        self.defaults.get(object_type)
    }

    /// Returns `true` if `object` is the default instance of its type.
    pub fn is_default(&self, object: &MetadataObject) -> bool {
        match (self.defaults.get(&object.object_type), &object.uid) {
            (Some(default), Some(uid)) => default.uid.as_ref() == Some(uid),
            _ => false,
        }
    }

    /// Default instance of `target` (or of one of its member types) that
    /// `reference` points at, if any.
    pub fn default_reference(&self, target: &ObjectType, reference: &ObjectRef) -> Option<&MetadataObject> {
        std::iter::once(target)
            .chain(self.members.get(target).into_iter().flatten())
            .filter_map(|t| self.defaults.get(t))
            .find(|d| {
                (reference.uid.is_some() && d.uid == reference.uid)
                    || (reference.code.is_some() && d.code == reference.code)
            })
    }

    // -----------------------------------------------------------------------
    // Uniqueness
    // -----------------------------------------------------------------------

    /// Owner of a unique property value, if any object claimed it.
    pub fn unique_owner(&self, object_type: &ObjectType, property: &str, value: &str) -> Option<&Uid> {
        self.uniqueness.get(object_type)?.get(property)?.get(value)
    }

    pub fn claim_unique(&mut self, object_type: &ObjectType, property: &str, value: String, owner: Uid) {
        self.uniqueness
            .entry(object_type.clone())
            .or_default()
            .entry(property.to_string())
            .or_default()
            .insert(value, owner);
    }

    /// Owner of a unique attribute value on a type, if any.
    pub fn attribute_owner(&self, object_type: &ObjectType, attribute: &Uid, value: &str) -> Option<&Uid> {
        self.attribute_values.get(object_type)?.get(attribute)?.get(value)
    }

    pub fn claim_attribute(&mut self, object_type: &ObjectType, attribute: &Uid, value: String, owner: Uid) {
        self.attribute_values
            .entry(object_type.clone())
            .or_default()
            .entry(attribute.clone())
            .or_default()
            .insert(value, owner);
    }

    // -----------------------------------------------------------------------
    // Attributes
    // -----------------------------------------------------------------------

    /// Register a definition and add it to the mandatory / unique sets of
    /// the types it applies to.
    pub fn add_attribute(&mut self, definition: AttributeDefinition) {
        for object_type in &definition.object_types {
            if definition.mandatory {
                self.mandatory_attributes
                    .entry(object_type.clone())
                    .or_default()
                    .insert(definition.uid.clone());
            }
            if definition.unique {
                self.unique_attributes
                    .entry(object_type.clone())
                    .or_default()
                    .insert(definition.uid.clone());
            }
        }
        self.attributes.insert(definition.uid.clone(), definition);
    }

    pub fn attribute(&self, uid: &Uid) -> Option<&AttributeDefinition> {
        self.attributes.get(uid)
    }

    pub fn mandatory_attributes(&self, object_type: &ObjectType) -> impl Iterator<Item = &Uid> {
        self.mandatory_attributes.get(object_type).into_iter().flatten()
    }

    pub fn unique_attributes(&self, object_type: &ObjectType) -> impl Iterator<Item = &Uid> {
        self.unique_attributes.get(object_type).into_iter().flatten()
    }

    pub fn is_unique_attribute(&self, object_type: &ObjectType, attribute: &Uid) -> bool {
        self.unique_attributes
            .get(object_type)
            .is_some_and(|set| set.contains(attribute))
    }
}
