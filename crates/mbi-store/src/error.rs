use mbi_types::{ObjectType, Uid};

/// Errors from storage operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// The object to update or delete does not exist.
    #[error("object not found: {object_type} {uid}")]
    NotFound { object_type: ObjectType, uid: Uid },

    /// An object with this UID is already stored.
    #[error("object already exists: {object_type} {uid}")]
    AlreadyExists { object_type: ObjectType, uid: Uid },

    /// Objects must carry a UID before they reach the store.
    #[error("cannot store {0} object without a uid")]
    MissingUid(ObjectType),

    /// The backend refused the write (constraint violation and the like).
    #[error("write rejected for {uid}: {reason}")]
    Rejected { uid: Uid, reason: String },

    /// Any other backend failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
