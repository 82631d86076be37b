//! Update support for the metadata bundle importer.
//!
//! - [`diff_objects`] / [`ObjectPatch`] -- field-level patch between the stored
//!   object and the incoming one, computed before merging and used as the
//!   UPDATE audit payload
//! - [`merge_objects`] -- applies a [`MergeMode`](mbi_types::MergeMode) to fold
//!   the incoming object into the stored one
//! - [`merge_sharing`] -- carries sharing settings across an update

pub mod merge;
pub mod patch;

pub use merge::{merge_objects, merge_sharing};
pub use patch::{diff_objects, ObjectPatch, PatchOperation};
