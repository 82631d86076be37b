use mbi_preheat::{unique_key, Preheat};
use mbi_report::{ErrorCode, ErrorReport, TypeReport};
use mbi_types::{BundleObject, ObjectType, PreheatIdentifier, Uid};

use crate::check::{reject_where, CheckContext, ValidationCheck};
use crate::error::GateError;

/// Display form of the object currently owning a value.
pub(crate) fn owner_name(preheat: &Preheat, object_type: &ObjectType, owner: &Uid) -> String {
    match preheat.get_by_uid(object_type, owner) {
        Some(entry) => PreheatIdentifier::Uid.identifiers_with_name(&entry.object),
        None => owner.to_string(),
    }
}

/// Native-property uniqueness against the uniqueness map.
///
/// A value owned by the object itself is never a clash. An accepted object
/// claims its values, so a later object of the same payload carrying the
/// same value is rejected.
pub struct UniquenessCheck;

impl ValidationCheck for UniquenessCheck {
    fn name(&self) -> &str {
        "uniqueness"
    }

    fn check(
        &self,
        object_type: &ObjectType,
        objects: &mut Vec<BundleObject>,
        ctx: &mut CheckContext<'_>,
    ) -> Result<TypeReport, GateError> {
        let schema = ctx.schemas.schema(object_type)?;
        let properties: Vec<&str> = schema.unique_properties().map(|p| p.name.as_str()).collect();
        if properties.is_empty() {
            return Ok(TypeReport::new(object_type.clone()));
        }
        let identifier = ctx.preheat.identifier();
        let preheat = &mut *ctx.preheat;

        Ok(reject_where(object_type, objects, ctx.atomic_mode, |entry: &mut BundleObject| {
            let object = &entry.object;
            let mut errors = Vec::new();
            let mut claims = Vec::new();

            for property in &properties {
                let Some(value) = unique_key(&object.value(property)) else {
                    continue;
                };
                match preheat.unique_owner(object_type, property, &value) {
                    Some(owner) if object.uid.as_ref() != Some(owner) => {
                        let owner = owner_name(preheat, object_type, owner);
                        errors.push(
                            ErrorReport::new(
                                object_type.clone(),
                                ErrorCode::E5003,
                                [property.to_string(), value.clone(), identifier.identifiers_with_name(object), owner],
                            )
                            .with_main_id(object.uid.clone())
                            .with_property(*property)
                            .with_value(value),
                        );
                    }
                    _ => claims.push((*property, value)),
                }
            }

            if errors.is_empty() {
                if let Some(uid) = &object.uid {
                    for (property, value) in claims {
                        preheat.claim_unique(object_type, property, value, uid.clone());
                    }
                }
            }
            errors
        }))
    }
}
