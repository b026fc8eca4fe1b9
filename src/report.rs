//! Structured error documents for ingestion and export validation.
//!
//! Ingestion errors are row-scoped and accumulate across a batch: one bad
//! row does not abort the remaining rows, and the full list is returned
//! together for structured client reporting. Export schema-validation
//! failures reuse the same document shape with path-annotated entries.
//!
//! The serialized shape is
//! `{success, message, filename?, errors: [...], schema_version?}` with each
//! error entry carrying whichever of `row`, `identifier`, `path`,
//! `category`, `code`, `keyword`, `context`, `message` applies.

use serde::{Deserialize, Serialize};

use crate::schema::SchemaValidationReport;

/// Machine-readable error code: identifier collision.
pub const CODE_DUPLICATE_IGSN: &str = "duplicate_igsn";
/// Machine-readable error code: required field absent.
pub const CODE_MISSING_REQUIRED_FIELD: &str = "missing_required_field";
/// Machine-readable error code: rejected date component.
pub const CODE_INVALID_DATE: &str = "invalid_date";
/// Machine-readable error code: unparseable CSV/XML structure or value.
pub const CODE_MALFORMED_INPUT: &str = "malformed_input";
/// Machine-readable error code: DataCite schema violation.
pub const CODE_SCHEMA_VALIDATION: &str = "schema_validation";

/// Broad error category for client-side grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Identifier collisions with persisted resources
    Conflict,
    /// Missing or rejected field values
    Validation,
    /// Structurally unparseable input
    Parse,
    /// DataCite schema violations
    Schema,
}

/// One row- or path-scoped error entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based data row number (header excluded), for ingestion errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// The identifier the row carried, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// JSON pointer into the exported document, for schema errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Broad category
    pub category: ErrorCategory,
    /// Machine-readable code
    pub code: String,
    /// Violated schema keyword, for schema errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Offending value or extra context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Human-readable message
    pub message: String,
}

impl RowError {
    /// An identifier-collision error for a row.
    #[must_use]
    pub fn duplicate_identifier(row: usize, identifier: &str) -> Self {
        RowError {
            row: Some(row),
            identifier: Some(identifier.to_string()),
            path: None,
            category: ErrorCategory::Conflict,
            code: CODE_DUPLICATE_IGSN.to_string(),
            keyword: None,
            context: None,
            message: format!("identifier '{identifier}' already exists"),
        }
    }

    /// A missing-required-field error for a row.
    #[must_use]
    pub fn missing_required_field(row: usize, identifier: Option<&str>, field: &str) -> Self {
        RowError {
            row: Some(row),
            identifier: identifier.map(str::to_string),
            path: None,
            category: ErrorCategory::Validation,
            code: CODE_MISSING_REQUIRED_FIELD.to_string(),
            keyword: None,
            context: Some(field.to_string()),
            message: format!("required field '{field}' is missing"),
        }
    }

    /// A rejected-date error for a row.
    #[must_use]
    pub fn invalid_date(row: usize, identifier: Option<&str>, field: &str, value: &str) -> Self {
        RowError {
            row: Some(row),
            identifier: identifier.map(str::to_string),
            path: None,
            category: ErrorCategory::Validation,
            code: CODE_INVALID_DATE.to_string(),
            keyword: None,
            context: Some(value.to_string()),
            message: format!("field '{field}' holds unresolvable date '{value}'"),
        }
    }

    /// A malformed-input error, row-scoped when the row is known.
    #[must_use]
    pub fn malformed_input(row: Option<usize>, message: impl Into<String>) -> Self {
        RowError {
            row,
            identifier: None,
            path: None,
            category: ErrorCategory::Parse,
            code: CODE_MALFORMED_INPUT.to_string(),
            keyword: None,
            context: None,
            message: message.into(),
        }
    }
}

/// The full structured result document for a batch or an export attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Whether the operation succeeded without errors
    pub success: bool,
    /// Summary message
    pub message: String,
    /// Name of the processed file, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Accumulated error entries; empty on success
    pub errors: Vec<RowError>,
    /// Schema version string, for export validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
}

impl BatchReport {
    /// A success document.
    #[must_use]
    pub fn success(message: impl Into<String>, filename: Option<String>) -> Self {
        BatchReport {
            success: true,
            message: message.into(),
            filename,
            errors: Vec::new(),
            schema_version: None,
        }
    }

    /// A failure document from accumulated row errors.
    #[must_use]
    pub fn failure(
        message: impl Into<String>,
        filename: Option<String>,
        errors: Vec<RowError>,
    ) -> Self {
        BatchReport {
            success: false,
            message: message.into(),
            filename,
            errors,
            schema_version: None,
        }
    }

    /// A failure document from a schema-validation report.
    #[must_use]
    pub fn from_schema_report(report: &SchemaValidationReport, filename: Option<String>) -> Self {
        let errors = report
            .errors
            .iter()
            .map(|violation| RowError {
                row: None,
                identifier: None,
                path: Some(violation.path.clone()),
                category: ErrorCategory::Schema,
                code: CODE_SCHEMA_VALIDATION.to_string(),
                keyword: Some(violation.keyword.clone()),
                context: violation.context.clone(),
                message: violation.message.clone(),
            })
            .collect();
        BatchReport {
            success: false,
            message: "exported document failed schema validation".to_string(),
            filename,
            errors,
            schema_version: Some(report.schema_version.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_identifier_shape() {
        let error = RowError::duplicate_identifier(3, "IGSN0007");
        assert_eq!(error.row, Some(3));
        assert_eq!(error.identifier.as_deref(), Some("IGSN0007"));
        assert_eq!(error.code, CODE_DUPLICATE_IGSN);
        assert_eq!(error.category, ErrorCategory::Conflict);
    }

    #[test]
    fn test_serialized_document_omits_absent_fields() {
        let report = BatchReport::failure(
            "1 row rejected",
            Some("upload.csv".to_string()),
            vec![RowError::missing_required_field(2, None, "title")],
        );
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["filename"], "upload.csv");
        assert!(value.get("schema_version").is_none());
        let entry = &value["errors"][0];
        assert_eq!(entry["row"], 2);
        assert_eq!(entry["code"], "missing_required_field");
        assert_eq!(entry["category"], "validation");
        assert!(entry.get("identifier").is_none());
        assert!(entry.get("path").is_none());
    }

    #[test]
    fn test_success_document() {
        let report = BatchReport::success("3 resources imported", None);
        assert!(report.success);
        assert!(report.errors.is_empty());
    }
}
