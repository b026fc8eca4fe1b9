//! DataCite JSON Schema validation.
//!
//! The schema document is embedded at compile time from
//! `schemas/datacite-4.5.json` and compiled once. Validation is
//! all-or-nothing: on failure the caller gets the full list of
//! path-annotated violations plus the schema version string, and no
//! partial document is ever returned.

use jsonschema::error::ValidationErrorKind;
use jsonschema::Validator;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version string reported alongside validation failures.
pub const DATACITE_SCHEMA_VERSION: &str = "datacite-4.5";

lazy_static! {
    static ref DATACITE_VALIDATOR: Validator = {
        let schema: Value = serde_json::from_str(include_str!("../schemas/datacite-4.5.json"))
            .expect("Invalid embedded schema");
        jsonschema::draft7::new(&schema).expect("Invalid embedded schema")
    };
}

/// One schema violation, annotated with the JSON pointer it occurred at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaViolation {
    /// JSON pointer into the validated document (e.g. `/creators/0/name`)
    pub path: String,
    /// Human-readable message
    pub message: String,
    /// The violated schema keyword (e.g. `required`, `type`)
    pub keyword: String,
    /// The offending instance value, abbreviated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// The full validation failure report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaValidationReport {
    /// Version of the schema the document was validated against
    pub schema_version: String,
    /// All violations found, in document order
    pub errors: Vec<SchemaViolation>,
}

/// Validate a DataCite attributes object against the embedded schema.
///
/// # Errors
///
/// Returns the path-annotated [`SchemaValidationReport`] when the document
/// violates the schema.
pub fn validate_datacite(attributes: &Value) -> Result<(), SchemaValidationReport> {
    let violations: Vec<SchemaViolation> = DATACITE_VALIDATOR
        .iter_errors(attributes)
        .map(|error| SchemaViolation {
            path: error.instance_path().to_string(),
            message: error.to_string(),
            keyword: keyword_of(error.kind()).to_string(),
            context: abbreviated(error.instance()),
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        tracing::warn!(
            violations = violations.len(),
            schema = DATACITE_SCHEMA_VERSION,
            "document failed schema validation"
        );
        Err(SchemaValidationReport {
            schema_version: DATACITE_SCHEMA_VERSION.to_string(),
            errors: violations,
        })
    }
}

/// Short keyword name for a validation error kind.
fn keyword_of(kind: &ValidationErrorKind) -> &'static str {
    match kind {
        ValidationErrorKind::Required { .. } => "required",
        ValidationErrorKind::Type { .. } => "type",
        ValidationErrorKind::Enum { .. } => "enum",
        ValidationErrorKind::MinItems { .. } => "minItems",
        ValidationErrorKind::MaxItems { .. } => "maxItems",
        ValidationErrorKind::MinLength { .. } => "minLength",
        ValidationErrorKind::MaxLength { .. } => "maxLength",
        ValidationErrorKind::Minimum { .. } => "minimum",
        ValidationErrorKind::Maximum { .. } => "maximum",
        ValidationErrorKind::Pattern { .. } => "pattern",
        ValidationErrorKind::Format { .. } => "format",
        ValidationErrorKind::AdditionalProperties { .. } => "additionalProperties",
        ValidationErrorKind::UniqueItems => "uniqueItems",
        _ => "schema",
    }
}

/// Abbreviate the offending value for the context field.
fn abbreviated(instance: &Value) -> Option<String> {
    if instance.is_null() {
        return None;
    }
    let rendered = instance.to_string();
    if rendered.len() > 120 {
        let mut cut = 120;
        while !rendered.is_char_boundary(cut) {
            cut -= 1;
        }
        Some(format!("{}…", &rendered[..cut]))
    } else {
        Some(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_valid() -> Value {
        json!({
            "creators": [{"name": "Förste, Christoph", "nameType": "Personal"}],
            "titles": [{"title": "Basalt core, site 12"}],
            "publisher": "GFZ Data Services",
            "publicationYear": 2024,
            "types": {
                "resourceType": "Core: Basalt",
                "resourceTypeGeneral": "PhysicalObject"
            }
        })
    }

    #[test]
    fn test_minimal_valid_document_passes() {
        assert!(validate_datacite(&minimal_valid()).is_ok());
    }

    #[test]
    fn test_missing_required_section_is_path_annotated() {
        let mut doc = minimal_valid();
        doc.as_object_mut().unwrap().remove("creators");

        let report = validate_datacite(&doc).unwrap_err();
        assert_eq!(report.schema_version, DATACITE_SCHEMA_VERSION);
        assert!(!report.errors.is_empty());
        assert_eq!(report.errors[0].keyword, "required");
    }

    #[test]
    fn test_nested_violation_carries_pointer() {
        let mut doc = minimal_valid();
        doc["creators"][0] = json!({"givenName": "Christoph"});

        let report = validate_datacite(&doc).unwrap_err();
        let paths: Vec<&str> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.iter().any(|p| p.starts_with("/creators/0")));
    }

    #[test]
    fn test_wrong_type_reports_keyword() {
        let mut doc = minimal_valid();
        doc["publicationYear"] = json!("2024");

        let report = validate_datacite(&doc).unwrap_err();
        assert!(report.errors.iter().any(|e| e.keyword == "type"));
    }

    #[test]
    fn test_invalid_contributor_type_rejected() {
        let mut doc = minimal_valid();
        doc["contributors"] = json!([{
            "name": "Weber, Maria",
            "contributorType": "ChiefVibesOfficer"
        }]);

        assert!(validate_datacite(&doc).is_err());
    }
}
