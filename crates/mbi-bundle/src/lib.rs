//! Metadata bundle importer.
//!
//! An import runs in three steps on an [`ObjectBundle`]:
//!
//! 1. **create**: the payload is grouped by type, preheated against the
//!    store (references resolved, UIDs assigned, uniqueness and attribute
//!    tables built) and split into persisted and not-yet-persisted objects
//! 2. **validate**: the validation gate runs its checks per type in
//!    dependency order, then the [`AtomicityController`] applies the atomic
//!    mode
//! 3. **commit**: the [`CommitEngine`] creates, updates or deletes the
//!    surviving objects through the store, running hooks and emitting
//!    audit records
//!
//! [`ObjectBundleService::import`] runs all three and returns an
//! [`ImportReport`].
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use mbi_bundle::{ImportConfig, ObjectBundleParams, ObjectBundleService};
//! use mbi_report::Status;
//! use mbi_schema::{Property, Schema, SchemaRegistry};
//! use mbi_store::InMemoryObjectStore;
//! use mbi_types::{MetadataObject, Principal};
//!
//! let schemas = SchemaRegistry::builder()
//!     .register(Schema::new("dataElement").with_property(Property::text("name").required()))
//!     .build()
//!     .unwrap();
//! let store = Arc::new(InMemoryObjectStore::new());
//! let service = ObjectBundleService::new(store.clone(), schemas);
//!
//! let params = ObjectBundleParams::new(Principal::superuser("UserAdmin01", "admin"), ImportConfig::default())
//!     .with_objects([MetadataObject::new("dataElement").with_name("ANC 1st visit")]);
//! let report = service.import(params).unwrap();
//! assert_eq!(report.status, Status::Ok);
//! assert_eq!(store.len(), 1);
//! ```

pub mod atomicity;
pub mod bundle;
pub mod commit;
pub mod config;
pub mod error;
pub mod params;
pub mod service;

pub use atomicity::AtomicityController;
pub use bundle::ObjectBundle;
pub use commit::CommitEngine;
pub use config::ImportConfig;
pub use error::{BundleError, BundleResult};
pub use params::ObjectBundleParams;
pub use service::{ImportReport, ObjectBundleService};
