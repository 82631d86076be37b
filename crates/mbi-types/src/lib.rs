//! Foundation types for the metadata bundle importer (MBI).
//!
//! This crate provides the identity, object and configuration types used
//! throughout the importer. Every other MBI crate depends on `mbi-types`.
//!
//! # Key Types
//!
//! - [`Uid`]: 11-character object identifier
//! - [`ObjectType`]: name of a registered metadata type
//! - [`Principal`]: the user submitting an import
//! - [`MetadataObject`]: one typed object of the payload or the store
//! - [`ObjectRef`]: a reference to another object, by UID and/or code
//! - [`ObjectMap`]: payload objects partitioned into persisted / not persisted
//! - [`ImportStrategy`], [`AtomicMode`], [`MergeMode`], [`FlushMode`],
//!   [`BundleMode`], [`PreheatIdentifier`]: bundle configuration

pub mod error;
pub mod identity;
pub mod mode;
pub mod object;
pub mod object_map;

pub use error::TypeError;
pub use identity::{Principal, Uid, UID_LENGTH};
pub use mode::{
    AtomicMode, BundleMode, BundleStatus, FlushMode, ImportStrategy, MergeMode, PreheatIdentifier,
};
pub use object::{Access, AttributeValue, MetadataObject, ObjectRef, ObjectType, Sharing};
pub use object_map::{BundleObject, ObjectMap, TypeObjects};
