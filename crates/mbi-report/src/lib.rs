//! Report model for the metadata bundle importer.
//!
//! Validation and commit produce a three-level tree: one [`TypeReport`] per
//! object type, one [`ObjectReport`] per offending or committed object, and
//! one [`ErrorReport`] per violation. Error reports carry a code and
//! positional arguments only; rendering them for humans is left to the
//! caller (see [`ErrorCode::template`] for the default English text).

pub mod bundle_report;
pub mod code;
pub mod object_report;
pub mod type_report;

pub use bundle_report::{ObjectBundleCommitReport, ObjectBundleValidationReport, Status};
pub use code::{ErrorCategory, ErrorCode};
pub use object_report::{ErrorReport, ObjectReport};
pub use type_report::{Stats, TypeReport};
