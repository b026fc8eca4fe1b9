//! Error types for metadata engine operations.
//!
//! This module provides the [`MetaError`] type for all engine operations
//! and the [`Result`] convenience type. Row-scoped ingestion errors that
//! accumulate across a batch live in the [`crate::report`] module; the
//! variants here cover single-operation failures.

use thiserror::Error;

use crate::schema::SchemaValidationReport;

/// Error type for all metadata engine operations.
///
/// Represents error conditions that can occur during ingestion, identity
/// resolution, or DataCite serialization.
#[derive(Error, Debug)]
pub enum MetaError {
    /// Error indicating unparseable CSV or XML structure.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Error indicating a rejected date component (month or day out of range).
    #[error("Invalid date component: {0}")]
    InvalidDateComponent(String),

    /// Error indicating a required field is absent from a record.
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Error indicating an identifier collides with an existing resource.
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    /// Error indicating the exported document failed DataCite schema validation.
    ///
    /// Carries the full path-annotated report; no partial document is returned.
    #[error("Schema validation failed against {}", .0.schema_version)]
    SchemaValidation(SchemaValidationReport),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`MetaError`].
pub type Result<T> = std::result::Result<T, MetaError>;
