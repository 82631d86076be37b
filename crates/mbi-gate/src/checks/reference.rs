use mbi_preheat::connect_references;
use mbi_report::{ErrorCode, ErrorReport, TypeReport};
use mbi_types::{BundleObject, ObjectType};

use crate::check::{reject_where, CheckContext, ValidationCheck};
use crate::error::GateError;

/// Reference integrity.
///
/// Normalises every reference of the object in place against the preheat
/// index, so commit never re-resolves. References that match neither an
/// indexed object nor a default instance are reported.
pub struct ReferenceCheck;

impl ValidationCheck for ReferenceCheck {
    fn name(&self) -> &str {
        "reference"
    }

    fn check(
        &self,
        object_type: &ObjectType,
        objects: &mut Vec<BundleObject>,
        ctx: &mut CheckContext<'_>,
    ) -> Result<TypeReport, GateError> {
        let identifier = ctx.preheat.identifier();
        let preheat = &*ctx.preheat;
        let schemas = ctx.schemas;

        Ok(reject_where(object_type, objects, ctx.atomic_mode, |entry: &mut BundleObject| {
            let unresolved = connect_references(preheat, schemas, &mut entry.object);
            let object = &entry.object;
            unresolved
                .into_iter()
                .map(|missing| {
                    ErrorReport::new(
                        object_type.clone(),
                        ErrorCode::E5002,
                        [missing.reference.to_string(), identifier.identifiers_with_name(object), missing.property.clone()],
                    )
                    .with_main_id(object.uid.clone())
                    .with_property(missing.property)
                })
                .collect()
        }))
    }
}
