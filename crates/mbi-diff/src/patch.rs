//! Field-level patch between two versions of an object.
//!
//! Objects are flattened to `BTreeMap<String, Value>` (identity fields,
//! properties and custom attribute values) and compared key by key.

use std::collections::BTreeMap;

use mbi_types::MetadataObject;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One change, addressed by a JSON-pointer style path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Remove { path: String, value: Value },
    Replace { path: String, old: Value, new: Value },
}

impl PatchOperation {
    pub fn path(&self) -> &str {
        match self {
            Self::Add { path, .. } | Self::Remove { path, .. } | Self::Replace { path, .. } => path,
        }
    }
}

/// The ordered list of changes turning one object into another.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPatch {
    pub operations: Vec<PatchOperation>,
}

impl ObjectPatch {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Paths touched by the patch, in order.
    pub fn paths(&self) -> Vec<&str> {
        self.operations.iter().map(PatchOperation::path).collect()
    }
}

fn flatten(object: &MetadataObject) -> BTreeMap<String, Value> {
    let mut fields: BTreeMap<String, Value> = object
        .properties
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (format!("/{k}"), v.clone()))
        .collect();
    if let Some(code) = &object.code {
        fields.insert("/code".into(), json!(code));
    }
    if let Some(name) = &object.name {
        fields.insert("/name".into(), json!(name));
    }
    for value in &object.attribute_values {
        fields.insert(format!("/attributeValues/{}", value.attribute), json!(value.value));
    }
    fields
}

/// Compute the patch turning `stored` into `incoming`.
///
/// Removals and replacements come first in key order, then additions.
pub fn diff_objects(stored: &MetadataObject, incoming: &MetadataObject) -> ObjectPatch {
    let old = flatten(stored);
    let new = flatten(incoming);
    let mut operations = Vec::new();

    for (path, old_value) in &old {
        match new.get(path) {
            Some(new_value) if new_value != old_value => operations.push(PatchOperation::Replace {
                path: path.clone(),
                old: old_value.clone(),
                new: new_value.clone(),
            }),
            Some(_) => {}
            None => operations.push(PatchOperation::Remove {
                path: path.clone(),
                value: old_value.clone(),
            }),
        }
    }

    for (path, value) in new {
        if !old.contains_key(&path) {
            operations.push(PatchOperation::Add { path, value });
        }
    }

    ObjectPatch { operations }
}
