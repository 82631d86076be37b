//! Validation gate for the metadata bundle importer.
//!
//! Every object of a bundle passes through the gate before it can be
//! committed. The gate runs an ordered chain of [`ValidationCheck`]s per
//! type; each check removes the objects it rejects, so later checks only
//! see survivors, and reports every rejection as structured
//! `ErrorReport`s. Validation never fails on bad objects: `Err` is reserved
//! for collaborator failures.
//!
//! The chain for creates and updates is:
//!
//! 1. duplicate identifiers within the payload (E5004)
//! 2. security, through an [`AccessControl`] collaborator (E3000-E3002)
//! 3. schema shape validation (E4000-E4008)
//! 4. hook validation
//! 5. native property uniqueness (E5003)
//! 6. mandatory custom attributes (E4011)
//! 7. unique custom attributes (E4009)
//! 8. reference integrity, normalising references in place (E5002)
//!
//! Existence is checked per strategy (E5000 / E5001).

pub mod access;
pub mod check;
pub mod checks;
pub mod error;
pub mod gate;

pub use access::{AccessControl, AllowAll, AuthorityAccessControl};
pub use check::{reject_where, CheckContext, CheckResult, ValidationCheck, ValidationPass};
pub use checks::{
    DuplicateCheck, ExistenceCheck, HookCheck, MandatoryAttributeCheck, ReferenceCheck, SchemaCheck,
    SecurityCheck, UniqueAttributeCheck, UniquenessCheck,
};
pub use error::GateError;
pub use gate::{GateOutcome, ValidationGate};
