use mbi_report::TypeReport;
use mbi_types::{BundleObject, ObjectType};

use crate::check::{reject_where, CheckContext, ValidationCheck};
use crate::error::GateError;

/// Field-level shape validation, delegated to the schema validator. Its
/// reports are attached verbatim.
pub struct SchemaCheck;

impl ValidationCheck for SchemaCheck {
    fn name(&self) -> &str {
        "schema"
    }

    fn check(
        &self,
        object_type: &ObjectType,
        objects: &mut Vec<BundleObject>,
        ctx: &mut CheckContext<'_>,
    ) -> Result<TypeReport, GateError> {
        let schema = ctx.schemas.schema(object_type)?;
        let validator = ctx.schema_validator;
        Ok(reject_where(object_type, objects, ctx.atomic_mode, |entry: &mut BundleObject| {
            validator.validate(schema, &entry.object)
        }))
    }
}
