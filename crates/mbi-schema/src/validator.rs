use chrono::{DateTime, NaiveDate};
use mbi_report::{ErrorCode, ErrorReport};
use mbi_types::MetadataObject;
use serde_json::Value;

use crate::property::{Property, PropertyKind, ValueType};
use crate::schema::Schema;

/// Field-level shape validation of one object against its schema.
///
/// Returned reports are attached to the object verbatim; a non-empty result
/// rejects the object.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, schema: &Schema, object: &MetadataObject) -> Vec<ErrorReport>;
}

/// Required, type, length and range checks driven by the property table.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultSchemaValidator;

impl SchemaValidator for DefaultSchemaValidator {
    fn validate(&self, schema: &Schema, object: &MetadataObject) -> Vec<ErrorReport> {
        let mut errors = Vec::new();
        for property in schema.properties.iter().filter(|p| p.persisted) {
            let value = object.value(&property.name);
            let report = |code: ErrorCode, args: Vec<String>| {
                ErrorReport::new(schema.object_type.clone(), code, args)
                    .with_main_id(object.uid.clone())
                    .with_property(property.name.clone())
            };

            if is_blank(&value) {
                if property.required {
                    errors.push(report(ErrorCode::E4000, vec![property.name.clone()]));
                }
                continue;
            }

            if let Some(expected) = type_mismatch(property, &value) {
                errors.push(report(ErrorCode::E4003, vec![property.name.clone(), expected]));
                continue;
            }

            if let Value::String(text) = &value {
                let length = text.chars().count();
                if let Some(max) = property.max_length.filter(|&max| length > max) {
                    errors.push(report(
                        ErrorCode::E4001,
                        vec![property.name.clone(), max.to_string(), length.to_string()],
                    ));
                }
                if let Some(min) = property.min_length.filter(|&min| length < min) {
                    errors.push(report(
                        ErrorCode::E4002,
                        vec![property.name.clone(), min.to_string(), length.to_string()],
                    ));
                }
            }

            if let Some(number) = value.as_f64() {
                let below = property.min.is_some_and(|min| number < min);
                let above = property.max.is_some_and(|max| number > max);
                if below || above {
                    let bound = |b: Option<f64>, open: &str| {
                        b.map(|v| v.to_string()).unwrap_or_else(|| open.to_string())
                    };
                    errors.push(report(
                        ErrorCode::E4008,
                        vec![
                            property.name.clone(),
                            bound(property.min, "-inf"),
                            bound(property.max, "inf"),
                            value.to_string(),
                        ],
                    ));
                }
            }
        }
        errors
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// The expected type name when `value` does not fit `property`.
fn type_mismatch(property: &Property, value: &Value) -> Option<String> {
    let fits = match &property.kind {
        PropertyKind::Simple(value_type) => match value_type {
            ValueType::Text => value.is_string(),
            ValueType::Integer => value.is_i64() || value.is_u64(),
            ValueType::Number => value.is_number(),
            ValueType::Boolean => value.is_boolean(),
            ValueType::Date => value.as_str().is_some_and(is_date),
            ValueType::Any => true,
        },
        PropertyKind::Reference(_) => value.is_object() || value.is_string(),
        PropertyKind::Collection(_) => value.is_array(),
        PropertyKind::Embedded(_) => match value {
            Value::Object(_) => true,
            Value::Array(items) => items.iter().all(Value::is_object),
            _ => false,
        },
    };
    if fits {
        return None;
    }
    Some(match &property.kind {
        PropertyKind::Simple(value_type) => value_type.to_string(),
        PropertyKind::Reference(_) => "REFERENCE".into(),
        PropertyKind::Collection(_) => "COLLECTION".into(),
        PropertyKind::Embedded(_) => "OBJECT".into(),
    })
}

fn is_date(text: &str) -> bool {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok() || DateTime::parse_from_rfc3339(text).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new("dataElement")
            .with_property(Property::text("name").required().length(Some(2), Some(10)))
            .with_property(Property::text("code"))
            .with_property(Property::simple("zeroIsSignificant", ValueType::Boolean))
            .with_property(Property::simple("aggregationLevel", ValueType::Integer).range(Some(0.0), Some(5.0)))
            .with_property(Property::simple("startDate", ValueType::Date))
            .with_property(Property::reference("categoryCombo", "categoryCombo"))
            .with_property(Property::collection("legendSets", "legendSet"))
            .with_property(Property::text("displayName").required().transient())
    }

    fn codes(errors: &[ErrorReport]) -> Vec<ErrorCode> {
        errors.iter().map(|e| e.error_code).collect()
    }

    #[test]
    fn valid_object_passes() {
        let object = MetadataObject::new("dataElement")
            .with_name("ANC")
            .with_property("zeroIsSignificant", true)
            .with_property("aggregationLevel", 3)
            .with_property("startDate", "2024-01-31")
            .with_property("categoryCombo", json!({"id": "bjDvmb4bfuf"}))
            .with_property("legendSets", json!([]));
        assert!(DefaultSchemaValidator.validate(&schema(), &object).is_empty());
    }

    #[test]
    fn missing_required_property() {
        let object = MetadataObject::new("dataElement");
        let errors = DefaultSchemaValidator.validate(&schema(), &object);
        assert_eq!(codes(&errors), vec![ErrorCode::E4000]);
        assert_eq!(errors[0].args, vec!["name".to_string()]);
        assert_eq!(errors[0].error_property.as_deref(), Some("name"));
    }

    #[test]
    fn length_bounds() {
        let long = MetadataObject::new("dataElement").with_name("a very long name");
        let errors = DefaultSchemaValidator.validate(&schema(), &long);
        assert_eq!(codes(&errors), vec![ErrorCode::E4001]);
        assert_eq!(errors[0].args, vec!["name", "10", "16"]);

        let short = MetadataObject::new("dataElement").with_name("a");
        assert_eq!(codes(&DefaultSchemaValidator.validate(&schema(), &short)), vec![ErrorCode::E4002]);
    }

    #[test]
    fn wrong_types() {
        let object = MetadataObject::new("dataElement")
            .with_name("ANC")
            .with_property("zeroIsSignificant", "yes")
            .with_property("aggregationLevel", 1.5)
            .with_property("startDate", "31/01/2024")
            .with_property("legendSets", json!({"id": "x"}));
        let errors = DefaultSchemaValidator.validate(&schema(), &object);
        assert_eq!(
            codes(&errors),
            vec![ErrorCode::E4003, ErrorCode::E4003, ErrorCode::E4003, ErrorCode::E4003]
        );
    }

    #[test]
    fn range_violation() {
        let object = MetadataObject::new("dataElement")
            .with_name("ANC")
            .with_property("aggregationLevel", 9);
        let errors = DefaultSchemaValidator.validate(&schema(), &object);
        assert_eq!(codes(&errors), vec![ErrorCode::E4008]);
        assert_eq!(errors[0].args, vec!["aggregationLevel", "0", "5", "9"]);
    }

    #[test]
    fn rfc3339_dates_are_accepted() {
        let object = MetadataObject::new("dataElement")
            .with_name("ANC")
            .with_property("startDate", "2024-01-31T10:00:00Z");
        assert!(DefaultSchemaValidator.validate(&schema(), &object).is_empty());
    }
}
