use mbi_report::TypeReport;
use mbi_types::{BundleObject, ObjectType};

use crate::check::{reject_where, CheckContext, ValidationCheck};
use crate::error::GateError;

/// Runs `validate` of every hook registered for the object's type.
pub struct HookCheck;

impl ValidationCheck for HookCheck {
    fn name(&self) -> &str {
        "hook"
    }

    fn check(
        &self,
        object_type: &ObjectType,
        objects: &mut Vec<BundleObject>,
        ctx: &mut CheckContext<'_>,
    ) -> Result<TypeReport, GateError> {
        let hooks = ctx.hooks.for_type(ctx.schemas, object_type);
        if hooks.is_empty() {
            return Ok(TypeReport::new(object_type.clone()));
        }
        let hook_ctx = ctx.hook_context();
        Ok(reject_where(object_type, objects, ctx.atomic_mode, |entry: &mut BundleObject| {
            hooks
                .iter()
                .flat_map(|hook| hook.validate(&entry.object, &hook_ctx))
                .collect()
        }))
    }
}
