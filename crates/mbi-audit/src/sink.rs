use std::sync::RwLock;

use tracing::info;

use crate::error::{AuditError, AuditResult};
use crate::record::{AuditOperation, AuditRecord};

/// Destination for audit records. A failure aborts the commit.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: AuditRecord) -> AuditResult<()>;
}

/// Keeps every record in memory, in emission order.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    records: RwLock<Vec<AuditRecord>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.read().expect("lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, operation: AuditOperation) -> usize {
        self.records
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|r| r.operation == operation)
            .count()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, record: AuditRecord) -> AuditResult<()> {
        self.records.write().expect("lock poisoned").push(record);
        Ok(())
    }
}

/// Emits each record as a structured event on target `mbi::audit`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: AuditRecord) -> AuditResult<()> {
        let payload = serde_json::to_string(&record.payload).map_err(|e| AuditError::Sink(e.to_string()))?;
        info!(
            target: "mbi::audit",
            id = %record.id,
            operation = %record.operation,
            object_type = %record.object_type,
            uid = record.uid.as_ref().map(|u| u.as_str()).unwrap_or_default(),
            actor = %record.actor,
            timestamp = %record.timestamp.to_rfc3339(),
            payload = %payload,
            "audit"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbi_types::MetadataObject;

    fn object() -> MetadataObject {
        MetadataObject::new("dataElement").with_uid("fbfJHSPpUQD")
    }

    #[test]
    fn in_memory_sink_keeps_order() {
        let sink = InMemoryAuditSink::new();
        assert!(sink.is_empty());
        sink.record(AuditRecord::create(&object(), "admin").unwrap()).unwrap();
        sink.record(AuditRecord::delete(&object(), "admin")).unwrap();

        let operations: Vec<AuditOperation> = sink.records().iter().map(|r| r.operation).collect();
        assert_eq!(operations, vec![AuditOperation::Create, AuditOperation::Delete]);
        assert_eq!(sink.count(AuditOperation::Delete), 1);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn tracing_sink_accepts_records() {
        let sink = TracingAuditSink;
        assert!(sink.record(AuditRecord::delete(&object(), "admin")).is_ok());
    }
}
