//! Schema collaborator for the metadata bundle importer.
//!
//! Every object type the importer handles is described once, at startup, by
//! a [`Schema`]: an explicit table of [`Property`] descriptors plus
//! type-level facts (default instance, shareability, abstract parents).
//! Schemas are collected into a [`SchemaRegistry`], which also computes the
//! deterministic type processing order from reference dependencies.
//!
//! Field-level shape checks are behind the [`SchemaValidator`] trait;
//! [`DefaultSchemaValidator`] covers required, type, length and range
//! constraints.

pub mod error;
pub mod property;
pub mod registry;
pub mod schema;
pub mod validator;

pub use error::{SchemaError, SchemaResult};
pub use property::{Property, PropertyKind, ValueType};
pub use registry::{SchemaRegistry, SchemaRegistryBuilder};
pub use schema::Schema;
pub use validator::{DefaultSchemaValidator, SchemaValidator};
