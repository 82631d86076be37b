/// Errors raised while building or emitting audit records.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// The object could not be serialised into a snapshot.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The sink refused or failed to record the entry.
    #[error("audit sink error: {0}")]
    Sink(String),
}

/// Convenience alias for audit results.
pub type AuditResult<T> = Result<T, AuditError>;
