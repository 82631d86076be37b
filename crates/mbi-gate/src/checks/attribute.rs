use mbi_report::{ErrorCode, ErrorReport, TypeReport};
use mbi_types::{BundleObject, ObjectType, Uid};

use crate::check::{reject_where, CheckContext, ValidationCheck};
use crate::checks::uniqueness::owner_name;
use crate::error::GateError;

/// Every attribute flagged mandatory for the type must carry a non-empty
/// value. Each missing attribute is reported on its own.
pub struct MandatoryAttributeCheck;

impl ValidationCheck for MandatoryAttributeCheck {
    fn name(&self) -> &str {
        "mandatory-attribute"
    }

    fn check(
        &self,
        object_type: &ObjectType,
        objects: &mut Vec<BundleObject>,
        ctx: &mut CheckContext<'_>,
    ) -> Result<TypeReport, GateError> {
        let mandatory: Vec<Uid> = ctx.preheat.mandatory_attributes(object_type).cloned().collect();
        if mandatory.is_empty() {
            return Ok(TypeReport::new(object_type.clone()));
        }

        Ok(reject_where(object_type, objects, ctx.atomic_mode, |entry: &mut BundleObject| {
            let object = &entry.object;
            mandatory
                .iter()
                .filter(|attribute| object.attribute_value(attribute).map_or(true, str::is_empty))
                .map(|attribute| {
                    ErrorReport::new(object_type.clone(), ErrorCode::E4011, [attribute.to_string()])
                        .with_main_id(object.uid.clone())
                        .with_property("attributeValues")
                })
                .collect()
        }))
    }
}

/// Custom attribute values flagged unique must not already be held by a
/// different object of the type.
pub struct UniqueAttributeCheck;

impl ValidationCheck for UniqueAttributeCheck {
    fn name(&self) -> &str {
        "unique-attribute"
    }

    fn check(
        &self,
        object_type: &ObjectType,
        objects: &mut Vec<BundleObject>,
        ctx: &mut CheckContext<'_>,
    ) -> Result<TypeReport, GateError> {
        if ctx.preheat.unique_attributes(object_type).next().is_none() {
            return Ok(TypeReport::new(object_type.clone()));
        }
        let preheat = &mut *ctx.preheat;

        Ok(reject_where(object_type, objects, ctx.atomic_mode, |entry: &mut BundleObject| {
            let object = &entry.object;
            let mut errors = Vec::new();
            let mut claims = Vec::new();

            for value in &object.attribute_values {
                if value.value.is_empty() || !preheat.is_unique_attribute(object_type, &value.attribute) {
                    continue;
                }
                match preheat.attribute_owner(object_type, &value.attribute, &value.value) {
                    Some(owner) if object.uid.as_ref() != Some(owner) => {
                        let owner = owner_name(preheat, object_type, owner);
                        errors.push(
                            ErrorReport::new(
                                object_type.clone(),
                                ErrorCode::E4009,
                                [value.attribute.to_string(), value.value.clone(), owner],
                            )
                            .with_main_id(object.uid.clone())
                            .with_property("attributeValues")
                            .with_value(value.value.clone()),
                        );
                    }
                    _ => claims.push((&value.attribute, value.value.clone())),
                }
            }

            if errors.is_empty() {
                if let Some(uid) = &object.uid {
                    for (attribute, value) in claims {
                        preheat.claim_attribute(object_type, attribute, value, uid.clone());
                    }
                }
            }
            errors
        }))
    }
}
