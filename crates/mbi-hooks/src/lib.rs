//! Lifecycle hooks for the metadata bundle importer.
//!
//! Hooks are registered explicitly, in order, on a [`HookRegistry`]. Each
//! hook may declare a [`HookTarget`]; the registry filters hooks per object,
//! per type and per bundle so callers never switch on concrete types.

pub mod error;
pub mod hook;
pub mod registry;

pub use error::{HookError, HookResult};
pub use hook::{HookContext, HookTarget, ObjectBundleHook};
pub use registry::HookRegistry;
