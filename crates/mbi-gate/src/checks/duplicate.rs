use std::collections::BTreeSet;

use mbi_report::{ErrorCode, ErrorReport, TypeReport};
use mbi_types::{BundleObject, ObjectType};

use crate::check::{reject_where, CheckContext, ValidationCheck};
use crate::error::GateError;

/// Rejects the second and later objects of a type that share an identifier.
///
/// The identifier is the one the bundle's preheat strategy matches on.
/// Objects without such an identifier are never duplicates.
pub struct DuplicateCheck;

impl ValidationCheck for DuplicateCheck {
    fn name(&self) -> &str {
        "duplicate"
    }

    fn check(
        &self,
        object_type: &ObjectType,
        objects: &mut Vec<BundleObject>,
        ctx: &mut CheckContext<'_>,
    ) -> Result<TypeReport, GateError> {
        let identifier = ctx.preheat.identifier();
        let mut seen = BTreeSet::new();

        objects.sort_by_key(|entry| entry.index);
        Ok(reject_where(object_type, objects, ctx.atomic_mode, |entry: &mut BundleObject| {
            let Some(id) = identifier.identifier_of(&entry.object) else {
                return Vec::new();
            };
            if seen.insert(id.to_string()) {
                return Vec::new();
            }
            vec![ErrorReport::new(object_type.clone(), ErrorCode::E5004, [id, object_type.as_str()])
                .with_main_id(entry.object.uid.clone())]
        }))
    }
}
