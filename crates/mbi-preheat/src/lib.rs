//! Reference index ("preheat") for the metadata bundle importer.
//!
//! Before validation, [`PreheatService`] walks every submitted object and
//! every reference reachable from it (including references inside embedded
//! objects), resolves them against the store in one batch per type, and
//! records the results in a [`Preheat`]. The index also holds:
//!
//! - each type's default instance
//! - the uniqueness map (type → property → value → owning UID)
//! - unique custom attribute values and the mandatory / unique attribute
//!   sets per type, taken from stored and submitted attribute definitions
//! - not-yet-persisted placeholders for every submitted object, so
//!   references between objects of the same payload resolve
//!
//! [`connect_references`] rewrites an object's references in place to point
//! at the indexed instances.

pub mod attribute;
pub mod connect;
pub mod error;
pub mod preheat;
pub mod service;

pub use attribute::AttributeDefinition;
pub use connect::{collect_references, connect_references, UnresolvedReference};
pub use error::{PreheatError, PreheatResult};
pub use preheat::{unique_key, Preheat, PreheatEntry};
pub use service::PreheatService;
