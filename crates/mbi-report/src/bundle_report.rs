use std::collections::BTreeMap;

use mbi_types::ObjectType;
use serde::{Deserialize, Serialize};

use crate::code::ErrorCode;
use crate::object_report::ErrorReport;
use crate::type_report::{Stats, TypeReport};

/// Overall outcome of an import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Ok,
    /// Errors were reported but some objects were still committed.
    Warning,
    /// Errors were reported and nothing was committed.
    Error,
}

impl Status {
    pub fn from_outcome(has_errors: bool, committed: usize) -> Self {
        match (has_errors, committed) {
            (false, _) => Self::Ok,
            (true, 0) => Self::Error,
            (true, _) => Self::Warning,
        }
    }
}

macro_rules! type_report_map {
    ($name:ident) => {
        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            /// Add a type report, merging with any report already held for
            /// the same type.
            pub fn add_type_report(&mut self, report: TypeReport) {
                match self.type_reports.get_mut(&report.object_type) {
                    Some(existing) => existing.merge(report),
                    None => {
                        self.type_reports.insert(report.object_type.clone(), report);
                    }
                }
            }

            pub fn type_report(&self, object_type: &ObjectType) -> Option<&TypeReport> {
                self.type_reports.get(object_type)
            }

            pub fn types(&self) -> impl Iterator<Item = &ObjectType> {
                self.type_reports.keys()
            }

            pub fn has_errors(&self) -> bool {
                self.type_reports.values().any(TypeReport::has_errors)
            }

            pub fn error_reports(&self) -> impl Iterator<Item = &ErrorReport> {
                self.type_reports.values().flat_map(TypeReport::error_reports)
            }

            pub fn error_reports_by_code(&self, code: ErrorCode) -> Vec<&ErrorReport> {
                self.error_reports().filter(|r| r.error_code == code).collect()
            }

            pub fn error_count(&self) -> usize {
                self.error_reports().count()
            }

            /// Stats summed across all types.
            pub fn stats(&self) -> Stats {
                let mut stats = Stats::default();
                for report in self.type_reports.values() {
                    stats += report.stats;
                }
                stats
            }

            pub fn is_empty(&self) -> bool {
                self.type_reports.is_empty()
            }
        }
    };
}

/// Validation outcome of a whole bundle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectBundleValidationReport {
    pub type_reports: BTreeMap<ObjectType, TypeReport>,
}

type_report_map!(ObjectBundleValidationReport);

/// Commit outcome of a whole bundle. Only types that had objects to commit
/// carry a report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectBundleCommitReport {
    pub type_reports: BTreeMap<ObjectType, TypeReport>,
}

type_report_map!(ObjectBundleCommitReport);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_report::ObjectReport;

    fn de() -> ObjectType {
        ObjectType::new("dataElement")
    }

    #[test]
    fn type_reports_merge_by_type() {
        let mut report = ObjectBundleValidationReport::new();
        let mut a = TypeReport::new(de());
        a.stats.ignored = 1;
        let mut failing = ObjectReport::new(de(), 0, None);
        failing.add_error(ErrorReport::new(de(), ErrorCode::E5004, ["x", "dataElement"]));
        a.add_object_report(failing);
        report.add_type_report(a);

        let mut b = TypeReport::new(de());
        b.stats.ignored = 2;
        report.add_type_report(b);

        assert_eq!(report.type_reports.len(), 1);
        assert_eq!(report.stats().ignored, 3);
        assert!(report.has_errors());
        assert_eq!(report.error_reports_by_code(ErrorCode::E5004).len(), 1);
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn commit_report_stats() {
        let mut report = ObjectBundleCommitReport::new();
        let mut created = TypeReport::new(de());
        created.stats.created = 2;
        report.add_type_report(created);
        let mut deleted = TypeReport::new(ObjectType::new("indicator"));
        deleted.stats.deleted = 1;
        report.add_type_report(deleted);

        assert_eq!(report.stats().committed(), 3);
        assert!(!report.has_errors());
        assert_eq!(report.types().count(), 2);
    }

    #[test]
    fn status_from_outcome() {
        assert_eq!(Status::from_outcome(false, 0), Status::Ok);
        assert_eq!(Status::from_outcome(true, 0), Status::Error);
        assert_eq!(Status::from_outcome(true, 4), Status::Warning);
    }
}
