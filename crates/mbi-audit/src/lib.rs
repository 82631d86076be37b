//! Audit trail for committed metadata changes.
//!
//! The commit engine emits one [`AuditRecord`] per created, updated or
//! deleted object (unless audit is skipped). Creates carry a snapshot of the
//! persisted object, updates the field-level patch computed before the
//! merge, deletes nothing. Records go to an [`AuditSink`].

pub mod error;
pub mod record;
pub mod sink;

pub use error::{AuditError, AuditResult};
pub use record::{AuditOperation, AuditPayload, AuditRecord};
pub use sink::{AuditSink, InMemoryAuditSink, TracingAuditSink};
