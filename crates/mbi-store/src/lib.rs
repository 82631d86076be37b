//! Storage collaborator for the metadata bundle importer.
//!
//! The importer never talks to a database directly. It resolves, lists,
//! saves, updates and deletes objects through the [`ObjectStore`] trait and
//! controls write visibility only through [`ObjectStore::flush`]. No
//! transaction is opened or closed here; the caller owns the ambient
//! transaction.
//!
//! # Storage Backends
//!
//! - [`InMemoryObjectStore`] -- session + flushed state behind `RwLock`s, for
//!   tests and embedding

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use traits::ObjectStore;
