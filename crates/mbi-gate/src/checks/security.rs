use mbi_report::{ErrorCode, ErrorReport, TypeReport};
use mbi_types::{BundleObject, ObjectType};

use crate::check::{reject_where, CheckContext, ValidationCheck, ValidationPass};
use crate::error::GateError;

/// Asks the access-control collaborator whether the principal may perform
/// the pass's operation.
///
/// Create is decided once per type. Update and delete are decided per
/// object, against the stored instance the object resolved to.
pub struct SecurityCheck;

impl ValidationCheck for SecurityCheck {
    fn name(&self) -> &str {
        "security"
    }

    fn check(
        &self,
        object_type: &ObjectType,
        objects: &mut Vec<BundleObject>,
        ctx: &mut CheckContext<'_>,
    ) -> Result<TypeReport, GateError> {
        let principal = ctx.principal;
        let access = ctx.access;
        let pass = ctx.pass;
        let identifier = ctx.preheat.identifier();
        let preheat = &*ctx.preheat;
        let user = principal.identifiers_with_name();

        let may_create = pass != ValidationPass::Create || access.can_create(principal, object_type);

        Ok(reject_where(object_type, objects, ctx.atomic_mode, |entry: &mut BundleObject| {
            let object = &entry.object;
            let stored = preheat.get_persisted(object).unwrap_or(object);
            let denied = match pass {
                ValidationPass::Create => {
                    (!may_create).then(|| (ErrorCode::E3000, object_type.to_string()))
                }
                ValidationPass::Update => (!access.can_update(principal, stored))
                    .then(|| (ErrorCode::E3001, identifier.identifiers_with_name(stored))),
                ValidationPass::Delete => (!access.can_delete(principal, stored))
                    .then(|| (ErrorCode::E3002, identifier.identifiers_with_name(stored))),
            };
            match denied {
                Some((code, target)) => vec![ErrorReport::new(object_type.clone(), code, [user.clone(), target])
                    .with_main_id(object.uid.clone())],
                None => Vec::new(),
            }
        }))
    }
}
