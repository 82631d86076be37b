use std::collections::BTreeMap;
use std::ops::AddAssign;

use mbi_types::ObjectType;
use serde::{Deserialize, Serialize};

use crate::code::ErrorCode;
use crate::object_report::{ErrorReport, ObjectReport};

/// Running counters for one type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Objects dropped by validation.
    pub ignored: usize,
}

impl Stats {
    pub fn total(&self) -> usize {
        self.created + self.updated + self.deleted + self.ignored
    }

    /// Objects actually written to the store.
    pub fn committed(&self) -> usize {
        self.created + self.updated + self.deleted
    }
}

impl AddAssign for Stats {
    fn add_assign(&mut self, other: Self) {
        self.created += other.created;
        self.updated += other.updated;
        self.deleted += other.deleted;
        self.ignored += other.ignored;
    }
}

/// All outcomes for one object type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeReport {
    pub object_type: ObjectType,
    pub stats: Stats,
    /// Keyed by the object's submission index.
    pub object_reports: BTreeMap<usize, ObjectReport>,
}

impl TypeReport {
    pub fn new(object_type: ObjectType) -> Self {
        Self {
            object_type,
            stats: Stats::default(),
            object_reports: BTreeMap::new(),
        }
    }

    /// Add a report, merging with any existing report for the same index.
    pub fn add_object_report(&mut self, report: ObjectReport) {
        match self.object_reports.get_mut(&report.index) {
            Some(existing) => existing.merge(report),
            None => {
                self.object_reports.insert(report.index, report);
            }
        }
    }

    pub fn object_report(&self, index: usize) -> Option<&ObjectReport> {
        self.object_reports.get(&index)
    }

    /// Fold `other` (for the same type) into this report.
    pub fn merge(&mut self, other: TypeReport) {
        self.stats += other.stats;
        for report in other.object_reports.into_values() {
            self.add_object_report(report);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.object_reports.values().any(ObjectReport::has_errors)
    }

    pub fn error_reports(&self) -> impl Iterator<Item = &ErrorReport> {
        self.object_reports
            .values()
            .flat_map(|r| r.error_reports.iter())
    }

    pub fn error_reports_by_code(&self, code: ErrorCode) -> Vec<&ErrorReport> {
        self.error_reports().filter(|r| r.error_code == code).collect()
    }

    /// Indices of objects that carry at least one error.
    pub fn rejected_indices(&self) -> Vec<usize> {
        self.object_reports
            .values()
            .filter(|r| r.has_errors())
            .map(|r| r.index)
            .collect()
    }

    /// True when the report carries neither counts nor object reports.
    pub fn is_empty(&self) -> bool {
        self.stats.total() == 0 && self.object_reports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn de() -> ObjectType {
        ObjectType::new("dataElement")
    }

    fn failing(index: usize, code: ErrorCode) -> ObjectReport {
        let mut report = ObjectReport::new(de(), index, None);
        report.add_error(ErrorReport::new(de(), code, ["x"]));
        report
    }

    #[test]
    fn reports_for_the_same_index_merge() {
        let mut report = TypeReport::new(de());
        report.add_object_report(failing(1, ErrorCode::E5003));
        report.add_object_report(failing(1, ErrorCode::E5002));
        report.add_object_report(failing(4, ErrorCode::E4000));

        assert_eq!(report.object_reports.len(), 2);
        assert_eq!(report.object_report(1).unwrap().error_reports.len(), 2);
        assert_eq!(report.rejected_indices(), vec![1, 4]);
        assert_eq!(report.error_reports_by_code(ErrorCode::E4000).len(), 1);
    }

    #[test]
    fn merge_sums_stats() {
        let mut a = TypeReport::new(de());
        a.stats.created = 2;
        a.stats.ignored = 1;
        let mut b = TypeReport::new(de());
        b.stats.updated = 3;
        b.add_object_report(failing(0, ErrorCode::E3001));

        a.merge(b);
        assert_eq!(a.stats, Stats { created: 2, updated: 3, deleted: 0, ignored: 1 });
        assert_eq!(a.stats.committed(), 5);
        assert!(a.has_errors());
    }

    #[test]
    fn new_report_is_empty() {
        let report = TypeReport::new(de());
        assert!(report.is_empty());
        assert!(!report.has_errors());
    }
}
