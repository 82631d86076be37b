use std::fmt;

use chrono::{DateTime, Utc};
use mbi_diff::ObjectPatch;
use mbi_types::{MetadataObject, ObjectType, Uid};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::AuditResult;

/// What happened to the object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOperation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        };
        write!(f, "{s}")
    }
}

/// Data carried by an audit record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum AuditPayload {
    /// Full serialised object, for creates.
    Snapshot(Value),
    /// Field-level changes against the stored object, for updates.
    Patch(ObjectPatch),
    None,
}

/// One committed change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Time-ordered record identifier.
    pub id: Uuid,
    pub object_type: ObjectType,
    pub uid: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub operation: AuditOperation,
    /// Username of the principal the import ran as.
    pub actor: String,
    pub timestamp: DateTime<Utc>,
    pub payload: AuditPayload,
}

impl AuditRecord {
    fn new(object: &MetadataObject, operation: AuditOperation, actor: &str, payload: AuditPayload) -> Self {
        Self {
            id: Uuid::now_v7(),
            object_type: object.object_type.clone(),
            uid: object.uid.clone(),
            code: object.code.clone(),
            operation,
            actor: actor.to_string(),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// A create record carrying a snapshot of the persisted object.
    pub fn create(object: &MetadataObject, actor: &str) -> AuditResult<Self> {
        let snapshot = serde_json::to_value(object)?;
        Ok(Self::new(object, AuditOperation::Create, actor, AuditPayload::Snapshot(snapshot)))
    }

    /// An update record carrying the patch computed before the merge.
    pub fn update(object: &MetadataObject, actor: &str, patch: ObjectPatch) -> Self {
        Self::new(object, AuditOperation::Update, actor, AuditPayload::Patch(patch))
    }

    pub fn delete(object: &MetadataObject, actor: &str) -> Self {
        Self::new(object, AuditOperation::Delete, actor, AuditPayload::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbi_diff::diff_objects;

    fn element() -> MetadataObject {
        MetadataObject::new("dataElement")
            .with_uid("fbfJHSPpUQD")
            .with_code("DE_ANC")
            .with_name("ANC")
    }

    #[test]
    fn create_carries_snapshot() {
        let record = AuditRecord::create(&element(), "admin").unwrap();
        assert_eq!(record.operation, AuditOperation::Create);
        assert_eq!(record.actor, "admin");
        assert_eq!(record.code.as_deref(), Some("DE_ANC"));
        match record.payload {
            AuditPayload::Snapshot(snapshot) => {
                assert_eq!(snapshot["id"], "fbfJHSPpUQD");
                assert_eq!(snapshot["type"], "dataElement");
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[test]
    fn update_carries_patch() {
        let incoming = element().with_name("ANC 1st visit");
        let patch = diff_objects(&element(), &incoming);
        let record = AuditRecord::update(&incoming, "admin", patch.clone());
        assert_eq!(record.payload, AuditPayload::Patch(patch));
    }

    #[test]
    fn record_ids_are_v7_and_distinct() {
        let first = AuditRecord::delete(&element(), "admin");
        let second = AuditRecord::delete(&element(), "admin");
        assert_eq!(first.id.get_version_num(), 7);
        assert_ne!(first.id, second.id);
        assert_eq!(first.payload, AuditPayload::None);
    }

    #[test]
    fn serializes_operation_in_upper_case() {
        let record = AuditRecord::delete(&element(), "admin");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["operation"], "DELETE");
        assert_eq!(json["payload"]["kind"], "none");
    }
}
