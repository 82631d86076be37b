use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid uid `{0}`: expected {expected} alphanumeric characters starting with a letter", expected = crate::UID_LENGTH)]
    InvalidUid(String),

    #[error("unknown {kind} value: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}
