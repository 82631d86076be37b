//! Built-in validation checks.

pub mod attribute;
pub mod duplicate;
pub mod existence;
pub mod hook;
pub mod reference;
pub mod schema;
pub mod security;
pub mod uniqueness;

pub use attribute::{MandatoryAttributeCheck, UniqueAttributeCheck};
pub use duplicate::DuplicateCheck;
pub use existence::ExistenceCheck;
pub use hook::HookCheck;
pub use reference::ReferenceCheck;
pub use schema::SchemaCheck;
pub use security::SecurityCheck;
pub use uniqueness::UniquenessCheck;
