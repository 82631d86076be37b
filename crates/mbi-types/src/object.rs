use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identity::Uid;
use crate::mode::PreheatIdentifier;

/// Name of a registered metadata type (e.g. `dataElement`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectType(String);

impl ObjectType {
    /// The built-in type holding custom attribute definitions.
    pub const ATTRIBUTE: &'static str = "attribute";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn attribute() -> Self {
        Self::new(Self::ATTRIBUTE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectType({})", self.0)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A value of a custom (schema-extension) attribute on an object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeValue {
    pub attribute: Uid,
    pub value: String,
}

impl AttributeValue {
    pub fn new(attribute: impl Into<Uid>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// One access grant within [`Sharing`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Access {
    pub id: Uid,
    pub access: String,
}

/// Ownership-derived sharing settings of an object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sharing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_access: Option<String>,
    #[serde(default)]
    pub user_accesses: Vec<Access>,
    #[serde(default)]
    pub user_group_accesses: Vec<Access>,
}

/// A reference from one object to another, serialized as
/// `{"id": "...", "code": "..."}` inside an object's properties.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub uid: Option<Uid>,
    pub code: Option<String>,
}

impl ObjectRef {
    pub fn by_uid(uid: impl Into<Uid>) -> Self {
        Self {
            uid: Some(uid.into()),
            code: None,
        }
    }

    pub fn by_code(code: impl Into<String>) -> Self {
        Self {
            uid: None,
            code: Some(code.into()),
        }
    }

    /// Reference pointing at `object` with all of its identifiers.
    pub fn of(object: &MetadataObject) -> Self {
        Self {
            uid: object.uid.clone(),
            code: object.code.clone(),
        }
    }

    /// Read a reference from a property value. A bare string is taken as a UID.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(uid) if !uid.is_empty() => Some(Self::by_uid(uid.as_str())),
            Value::Object(map) => {
                let text = |key: &str| {
                    map.get(key)
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                };
                let reference = Self {
                    uid: text("id").map(Uid::new),
                    code: text("code"),
                };
                (!reference.is_empty()).then_some(reference)
            }
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(uid) = &self.uid {
            map.insert("id".into(), Value::String(uid.to_string()));
        }
        if let Some(code) = &self.code {
            map.insert("code".into(), Value::String(code.clone()));
        }
        Value::Object(map)
    }

    pub fn is_empty(&self) -> bool {
        self.uid.is_none() && self.code.is_none()
    }

    /// The identifier this reference carries for the given strategy.
    pub fn identifier(&self, identifier: PreheatIdentifier) -> Option<&str> {
        let uid = self.uid.as_ref().map(Uid::as_str);
        match identifier {
            PreheatIdentifier::Uid => uid,
            PreheatIdentifier::Code => self.code.as_deref(),
            PreheatIdentifier::Auto => uid.or(self.code.as_deref()),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.uid, &self.code) {
            (Some(uid), Some(code)) => write!(f, "[{uid}, {code}]"),
            (Some(uid), None) => write!(f, "[{uid}]"),
            (None, Some(code)) => write!(f, "[{code}]"),
            (None, None) => f.write_str("[]"),
        }
    }
}

/// One typed metadata object, either submitted in a payload or held by the
/// store.
///
/// `uid`, `code` and `name` are first-class fields because identifier
/// strategies and reports need them; every other field lives in
/// `properties` and is described by the type's schema. Reference-valued
/// properties hold [`ObjectRef`] values (`{"id": ..}`) or arrays of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataObject {
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attribute_values: Vec<AttributeValue>,
    /// The user that owns (created) the object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharing: Option<Sharing>,
}

impl MetadataObject {
    pub fn new(object_type: impl Into<ObjectType>) -> Self {
        Self {
            object_type: object_type.into(),
            uid: None,
            code: None,
            name: None,
            properties: BTreeMap::new(),
            attribute_values: Vec::new(),
            owner: None,
            sharing: None,
        }
    }

    pub fn with_uid(mut self, uid: impl Into<Uid>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name: String = name.into();
        self.set_value(&name, value.into());
        self
    }

    /// Set a reference property to point at `target`.
    pub fn with_reference(mut self, name: impl Into<String>, target: ObjectRef) -> Self {
        self.properties.insert(name.into(), target.to_value());
        self
    }

    /// Set a collection property to reference every entry of `targets`.
    pub fn with_references(
        mut self,
        name: impl Into<String>,
        targets: impl IntoIterator<Item = ObjectRef>,
    ) -> Self {
        let values = targets.into_iter().map(|r| r.to_value()).collect();
        self.properties.insert(name.into(), Value::Array(values));
        self
    }

    pub fn with_attribute_value(mut self, attribute: impl Into<Uid>, value: impl Into<String>) -> Self {
        self.attribute_values.push(AttributeValue::new(attribute, value));
        self
    }

    /// Value of a named field. `code` and `name` read the identity fields;
    /// anything else reads `properties`. Missing fields read as `Null`.
    pub fn value(&self, property: &str) -> Value {
        let text = |s: &Option<String>| s.clone().map(Value::String).unwrap_or(Value::Null);
        match property {
            "id" | "uid" => self
                .uid
                .as_ref()
                .map(|u| Value::String(u.to_string()))
                .unwrap_or(Value::Null),
            "code" => text(&self.code),
            "name" => text(&self.name),
            _ => self.properties.get(property).cloned().unwrap_or(Value::Null),
        }
    }

    /// Set a named field; the counterpart of [`MetadataObject::value`].
    /// The UID is never written through this path.
    pub fn set_value(&mut self, property: &str, value: Value) {
        let text = |v: Value| match v {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        };
        match property {
            "id" | "uid" => {}
            "code" => self.code = text(value),
            "name" => self.name = text(value),
            _ => {
                self.properties.insert(property.to_string(), value);
            }
        }
    }

    /// Returns `true` if the field exists and is not `Null`.
    pub fn has_value(&self, property: &str) -> bool {
        !self.value(property).is_null()
    }

    /// Value of a custom attribute, if the object carries one.
    pub fn attribute_value(&self, attribute: &Uid) -> Option<&str> {
        self.attribute_values
            .iter()
            .find(|av| &av.attribute == attribute)
            .map(|av| av.value.as_str())
    }

    /// Best human-readable label: name, then code, then UID.
    pub fn display_name(&self) -> Option<String> {
        self.name
            .clone()
            .or_else(|| self.code.clone())
            .or_else(|| self.uid.as_ref().map(Uid::to_string))
    }

    /// Read a reference property.
    pub fn reference(&self, property: &str) -> Option<ObjectRef> {
        self.properties.get(property).and_then(ObjectRef::from_value)
    }

    /// Read a collection-of-references property. Entries that are not
    /// references are skipped.
    pub fn references(&self, property: &str) -> Vec<ObjectRef> {
        match self.properties.get(property) {
            Some(Value::Array(items)) => items.iter().filter_map(ObjectRef::from_value).collect(),
            _ => Vec::new(),
        }
    }
}
