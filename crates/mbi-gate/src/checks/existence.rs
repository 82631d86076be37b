use mbi_report::{ErrorCode, ErrorReport, TypeReport};
use mbi_types::{BundleObject, ObjectType};

use crate::check::{reject_where, CheckContext, ValidationCheck, ValidationPass};
use crate::error::GateError;

/// Rejects every object it is given as being on the wrong side of the store.
///
/// The gate runs it over the persisted slice during a create pass (E5000)
/// and over the not-yet-persisted slice during update and delete passes
/// (E5001).
pub struct ExistenceCheck;

impl ValidationCheck for ExistenceCheck {
    fn name(&self) -> &str {
        "existence"
    }

    fn check(
        &self,
        object_type: &ObjectType,
        objects: &mut Vec<BundleObject>,
        ctx: &mut CheckContext<'_>,
    ) -> Result<TypeReport, GateError> {
        let code = match ctx.pass {
            ValidationPass::Create => ErrorCode::E5000,
            ValidationPass::Update | ValidationPass::Delete => ErrorCode::E5001,
        };
        let identifier = ctx.preheat.identifier();

        Ok(reject_where(object_type, objects, ctx.atomic_mode, |entry: &mut BundleObject| {
            let object = &entry.object;
            let id = identifier.identifier_of(object).unwrap_or_default().to_string();
            vec![ErrorReport::new(object_type.clone(), code, [id, identifier.identifiers_with_name(object)])
                .with_main_id(object.uid.clone())]
        }))
    }
}
