use std::fmt;

use mbi_types::{BundleObject, ObjectType, Uid};
use serde::{Deserialize, Serialize};

use crate::code::ErrorCode;

// ---------------------------------------------------------------------------
// ErrorReport
// ---------------------------------------------------------------------------

/// One violation found on one object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// Type of the object the error was raised on.
    pub main_type: ObjectType,
    pub error_code: ErrorCode,
    /// Positional arguments for the code's message template.
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_id: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ErrorReport {
    pub fn new<I, S>(main_type: ObjectType, error_code: ErrorCode, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            main_type,
            error_code,
            args: args.into_iter().map(Into::into).collect(),
            main_id: None,
            error_property: None,
            value: None,
        }
    }

    pub fn with_main_id(mut self, uid: Option<Uid>) -> Self {
        self.main_id = uid;
        self
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.error_property = Some(property.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// The default English rendering of this report.
    pub fn message(&self) -> String {
        self.error_code.render(&self.args)
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_code, self.message())
    }
}

// ---------------------------------------------------------------------------
// ObjectReport
// ---------------------------------------------------------------------------

/// Outcome for one payload object.
///
/// `index` is the object's position in the submitted list for its type and
/// is the key under which the report is merged into a [`TypeReport`].
///
/// [`TypeReport`]: crate::TypeReport
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReport {
    pub object_type: ObjectType,
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub error_reports: Vec<ErrorReport>,
}

impl ObjectReport {
    pub fn new(object_type: ObjectType, index: usize, uid: Option<Uid>) -> Self {
        Self {
            object_type,
            index,
            uid,
            display_name: None,
            error_reports: Vec::new(),
        }
    }

    /// An empty report identifying `entry`.
    pub fn for_object(entry: &BundleObject) -> Self {
        Self {
            object_type: entry.object.object_type.clone(),
            index: entry.index,
            uid: entry.object.uid.clone(),
            display_name: entry.object.display_name(),
            error_reports: Vec::new(),
        }
    }

    pub fn add_error(&mut self, report: ErrorReport) {
        self.error_reports.push(report);
    }

    pub fn add_errors(&mut self, reports: impl IntoIterator<Item = ErrorReport>) {
        self.error_reports.extend(reports);
    }

    pub fn has_errors(&self) -> bool {
        !self.error_reports.is_empty()
    }

    pub fn error_codes(&self) -> Vec<ErrorCode> {
        self.error_reports.iter().map(|r| r.error_code).collect()
    }

    /// Fold another report for the same object into this one. Identity
    /// fields missing here are taken from `other`.
    pub fn merge(&mut self, other: ObjectReport) {
        if self.uid.is_none() {
            self.uid = other.uid;
        }
        if self.display_name.is_none() {
            self.display_name = other.display_name;
        }
        self.error_reports.extend(other.error_reports);
    }
}
