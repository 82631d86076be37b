use mbi_schema::SchemaError;

/// Errors that stop the validation pipeline.
///
/// Findings about objects are never errors; they are reported as
/// `ErrorReport`s. A `GateError` means a collaborator could not do its job.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GateError {
    /// The schema registry could not describe a type being validated.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A check failed for reasons unrelated to the objects it was given.
    #[error("check error in '{check}': {message}")]
    CheckError { check: String, message: String },
}

impl GateError {
    /// Create a check error with a name and message.
    pub fn check(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CheckError {
            check: check.into(),
            message: message.into(),
        }
    }
}
