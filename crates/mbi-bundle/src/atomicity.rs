use mbi_report::ObjectBundleValidationReport;
use mbi_types::{AtomicMode, ObjectMap};
use tracing::info;

/// Applies the bundle's atomic mode once every type is validated.
///
/// Under [`AtomicMode::All`] any error anywhere empties every pending list
/// of every type. OBJECT and NONE leave the lists as the checks left them.
#[derive(Clone, Copy, Debug)]
pub struct AtomicityController {
    mode: AtomicMode,
}

impl AtomicityController {
    pub fn new(mode: AtomicMode) -> Self {
        Self { mode }
    }

    /// Returns `true` if the pending lists were cleared.
    pub fn apply(&self, report: &ObjectBundleValidationReport, object_map: &mut ObjectMap) -> bool {
        if self.mode != AtomicMode::All || !report.has_errors() {
            return false;
        }
        let discarded = object_map.len();
        object_map.clear_objects();
        info!(
            errors = report.error_count(),
            discarded,
            "validation errors under atomic mode ALL, nothing will be committed"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbi_report::{ErrorCode, ErrorReport, ObjectReport, TypeReport};
    use mbi_types::{BundleObject, MetadataObject, ObjectType};

    fn map() -> ObjectMap {
        let mut map = ObjectMap::new();
        map.insert(false, BundleObject::new(0, MetadataObject::new("dataElement").with_uid("DeAncVisit1")));
        map.insert(true, BundleObject::new(0, MetadataObject::new("dataSet").with_uid("DsAncForm01")));
        map
    }

    fn failing_report() -> ObjectBundleValidationReport {
        let object_type = ObjectType::new("dataElement");
        let mut object_report = ObjectReport::new(object_type.clone(), 1, None);
        object_report.add_error(ErrorReport::new(object_type.clone(), ErrorCode::E4000, ["name"]));
        let mut type_report = TypeReport::new(object_type);
        type_report.add_object_report(object_report);
        let mut report = ObjectBundleValidationReport::new();
        report.add_type_report(type_report);
        report
    }

    #[test]
    fn all_clears_every_type_on_any_error() {
        let mut map = map();
        assert!(AtomicityController::new(AtomicMode::All).apply(&failing_report(), &mut map));
        assert!(map.is_empty());
        assert!(map.contains_type(&ObjectType::new("dataSet")));
    }

    #[test]
    fn all_keeps_objects_without_errors() {
        let mut map = map();
        assert!(!AtomicityController::new(AtomicMode::All).apply(&ObjectBundleValidationReport::new(), &mut map));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn object_and_none_never_clear() {
        for mode in [AtomicMode::Object, AtomicMode::None] {
            let mut map = map();
            assert!(!AtomicityController::new(mode).apply(&failing_report(), &mut map));
            assert_eq!(map.len(), 2);
        }
    }
}
