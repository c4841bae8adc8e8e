//! Validation of profile update bodies.
//!
//! Each patchable section (`name`, `healthData`, `preferences`) is
//! deserialized on its own, so a type or enum error is reported against
//! that section. Range and length rules are `validator` derives on the
//! model structs. All failures are returned together, each tagged with the
//! dotted camelCase path of the offending field. Other keys are ignored.

use crate::models::ProfilePatch;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// A present, non-null section deserialized as `T`. A section of the wrong
/// shape is recorded as an error against its key.
fn section<T: DeserializeOwned>(
    body: &Map<String, Value>,
    key: &str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let value = body.get(key).filter(|v| !v.is_null())?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            errors.push(FieldError::new(key, e.to_string()));
            None
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        camel_case(field)
    } else {
        format!("{}.{}", prefix, camel_case(field))
    }
}

/// Flatten nested `validator` errors into dotted field paths.
fn flatten(prefix: &str, invalid: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in invalid.errors() {
        let path = join(prefix, field);
        match kind {
            ValidationErrorsKind::Field(failures) => {
                for failure in failures {
                    let message = match &failure.message {
                        Some(message) => message.to_string(),
                        None => format!("invalid value ({})", failure.code),
                    };
                    out.push(FieldError::new(&path, message));
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

impl ProfilePatch {
    /// Validate an update body and build the patch it describes.
    ///
    /// `null` sections count as absent. Errors come back sorted by field.
    pub fn from_json(body: &Value) -> Result<ProfilePatch, Vec<FieldError>> {
        let Some(body) = body.as_object() else {
            return Err(vec![FieldError::new(
                "body",
                "Request body must be a JSON object",
            )]);
        };

        let mut errors = Vec::new();
        let patch = ProfilePatch {
            name: section::<String>(body, "name", &mut errors).map(|n| n.trim().to_string()),
            health_data: section(body, "healthData", &mut errors),
            preferences: section(body, "preferences", &mut errors),
        };
        if let Err(invalid) = patch.validate() {
            flatten("", &invalid, &mut errors);
        }

        if errors.is_empty() {
            Ok(patch)
        } else {
            errors.sort_by(|a, b| a.field.cmp(&b.field));
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertThreshold, Condition, Sensitivity};
    use serde_json::json;

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_valid_patch() {
        let patch = ProfilePatch::from_json(&json!({
            "name": "  Ada Lovelace ",
            "email": "ignored@example.com",
            "healthData": { "age": 36, "conditions": ["asthma", "copd"], "sensitivity": "high" },
            "preferences": {
                "alertThreshold": "unhealthy",
                "location": { "latitude": 51.5, "longitude": -0.12, "city": "London" }
            }
        }))
        .unwrap();

        assert_eq!(patch.name.as_deref(), Some("Ada Lovelace"));
        let health = patch.health_data.unwrap();
        assert_eq!(health.age, Some(36));
        assert_eq!(health.conditions, vec![Condition::Asthma, Condition::Copd]);
        assert_eq!(health.sensitivity, Sensitivity::High);
        let preferences = patch.preferences.unwrap();
        assert_eq!(preferences.alert_threshold, AlertThreshold::Unhealthy);
        assert!(preferences.alerts_enabled);
        assert_eq!(
            preferences.location.and_then(|l| l.city),
            Some("London".to_string())
        );
    }

    #[test]
    fn test_empty_patch_is_valid() {
        assert_eq!(ProfilePatch::from_json(&json!({})).unwrap(), ProfilePatch::default());
        let nulls = json!({ "name": null, "healthData": null, "preferences": null });
        assert_eq!(ProfilePatch::from_json(&nulls).unwrap(), ProfilePatch::default());
    }

    #[test]
    fn test_range_and_length_failures_are_reported_together() {
        let errors = ProfilePatch::from_json(&json!({
            "name": " a ",
            "healthData": { "age": 121, "conditions": ["asthma"] },
            "preferences": {
                "location": { "latitude": 91, "longitude": -181 }
            }
        }))
        .unwrap_err();

        assert_eq!(
            fields(&errors),
            vec![
                "healthData.age",
                "name",
                "preferences.location.latitude",
                "preferences.location.longitude",
            ]
        );
        assert_eq!(errors[0].message, "Age must be between 0 and 120");
        assert_eq!(errors[1].message, "Name must be between 2 and 50 characters");
        assert_eq!(errors[2].message, "Invalid latitude");
    }

    #[test]
    fn test_name_length_counts_trimmed_characters() {
        assert!(ProfilePatch::from_json(&json!({ "name": "  Al  " })).is_ok());
        assert!(ProfilePatch::from_json(&json!({ "name": "é" })).is_err());
        assert!(ProfilePatch::from_json(&json!({ "name": "x".repeat(50) })).is_ok());
        assert!(ProfilePatch::from_json(&json!({ "name": "x".repeat(51) })).is_err());
    }

    #[test]
    fn test_unknown_enum_values_are_rejected_per_section() {
        let errors = ProfilePatch::from_json(&json!({
            "healthData": { "conditions": ["asthma", "flu"] },
            "preferences": { "alertThreshold": "bad" }
        }))
        .unwrap_err();
        assert_eq!(fields(&errors), vec!["healthData", "preferences"]);
        assert!(errors[0].message.contains("flu"), "{}", errors[0].message);
        assert!(errors[1].message.contains("bad"), "{}", errors[1].message);
    }

    #[test]
    fn test_wrong_types() {
        let errors = ProfilePatch::from_json(&json!({
            "name": 7,
            "healthData": { "age": -1 },
            "preferences": []
        }))
        .unwrap_err();
        assert_eq!(fields(&errors), vec!["healthData", "name", "preferences"]);

        let errors = ProfilePatch::from_json(&json!({
            "preferences": { "alertsEnabled": "yes" }
        }))
        .unwrap_err();
        assert_eq!(fields(&errors), vec!["preferences"]);

        assert_eq!(fields(&ProfilePatch::from_json(&json!([1])).unwrap_err()), vec!["body"]);
    }

    #[test]
    fn test_age_bounds_are_inclusive() {
        assert!(ProfilePatch::from_json(&json!({ "healthData": { "age": 0 } })).is_ok());
        assert!(ProfilePatch::from_json(&json!({ "healthData": { "age": 120 } })).is_ok());
        assert!(ProfilePatch::from_json(&json!({ "healthData": { "age": 30.5 } })).is_err());
    }

    #[test]
    fn test_field_paths_are_camel_case() {
        assert_eq!(camel_case("health_data"), "healthData");
        assert_eq!(join("preferences", "alert_threshold"), "preferences.alertThreshold");
        assert_eq!(join("", "name"), "name");
    }
}
