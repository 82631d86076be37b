use mbi_store::StoreError;

/// Errors raised while building the reference index.
#[derive(Debug, thiserror::Error)]
pub enum PreheatError {
    /// The store failed while resolving or listing objects.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias for preheat results.
pub type PreheatResult<T> = Result<T, PreheatError>;
