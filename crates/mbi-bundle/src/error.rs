use mbi_audit::AuditError;
use mbi_gate::GateError;
use mbi_hooks::HookError;
use mbi_preheat::PreheatError;
use mbi_schema::SchemaError;
use mbi_store::StoreError;
use mbi_types::BundleStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundleError {
    /// An operation was called on a bundle in the wrong lifecycle state.
    #[error("bundle is {actual}, expected {expected}")]
    InvalidStatus {
        expected: BundleStatus,
        actual: BundleStatus,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("preheat error: {0}")]
    Preheat(#[from] PreheatError),

    #[error("validation error: {0}")]
    Gate(#[from] GateError),

    #[error("hook error: {0}")]
    Hook(#[from] HookError),

    #[error("audit error: {0}")]
    Audit(#[from] AuditError),
}

pub type BundleResult<T> = Result<T, BundleError>;
