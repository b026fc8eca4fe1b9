#![doc = include_str!("../README.md")]

//! # Metanorm: Bibliographic Metadata Normalization & Export Engine
//!
//! A library for curating bibliographic metadata of physical samples (IGSN)
//! and datasets: reconciling person/institution identities across
//! heterogeneous inputs, resolving partial dates into canonical ranges, and
//! serializing resource graphs to and from the DataCite metadata schema.
//!
//! ## Quick Start
//!
//! ### Ingesting a CSV batch
//!
//! ```ignore
//! use metanorm::csv_import::{import_csv, ImportOptions};
//!
//! let outcome = import_csv(&bytes, &ImportOptions::default());
//! for resource in &outcome.resources {
//!     println!("{:?}", resource.main_title());
//! }
//! let report = outcome.report(Some("upload.csv".to_string()));
//! ```
//!
//! ### Exporting to DataCite JSON
//!
//! ```ignore
//! use chrono::FixedOffset;
//! use metanorm::datacite_json::resource_to_datacite_json;
//! use metanorm::export::ExportOptions;
//!
//! let options = ExportOptions::new(FixedOffset::east_opt(3600).unwrap())
//!     .with_publisher_fallback("GFZ Data Services");
//! let document = resource_to_datacite_json(&resource, &options)?;
//! ```
//!
//! ## Modules
//!
//! - [`resource`] — Core resource graph structures (`Resource`, `Agent`,
//!   `GeoLocation`, `Size`, …)
//! - [`normalize`] — Identity comparison keys (umlaut folding, whitespace
//!   collapse)
//! - [`dates`] — Granular date resolution and DataCite range rendering
//! - [`roles`] — Closed creator/contributor role vocabulary
//! - [`identity`] — Identity resolution (deduplication, contact flags,
//!   reuse guard)
//! - [`csv_import`] — Pipe-delimited CSV batch ingestion
//! - [`xml_import`] — DataCite XML ingestion
//! - [`datacite_json`] — DataCite JSON serialization/deserialization
//! - [`datacite_xml`] — DataCite XML serialization
//! - [`schema`] — DataCite JSON Schema validation
//! - [`export`] — Export configuration and filename derivation
//! - [`report`] — Structured, row-scoped error documents
//! - [`error`] — Error types and result type
//!
//! ## Engine Boundaries
//!
//! The engine is synchronous and side-effect free: callers hand it raw rows
//! or documents and receive back graphs, documents, or structured error
//! reports. Persistence, HTTP transport, and access control live in the
//! surrounding application.

pub mod csv_import;
pub mod datacite_json;
pub mod datacite_xml;
pub mod dates;
pub mod error;
pub mod export;
pub mod identity;
pub mod normalize;
pub mod report;
/// Core resource graph structures (`Resource`, `Agent`, collections)
pub mod resource;
pub mod roles;
pub mod schema;
pub mod xml_import;

pub use csv_import::{import_csv, ImportOptions, ImportOutcome};
pub use datacite_json::{datacite_json_to_resource, resource_to_datacite_json};
pub use datacite_xml::resource_to_datacite_xml;
pub use error::{MetaError, Result};
pub use export::{export_filename, ExportOptions};
pub use identity::{can_reuse_existing, resolve_identities, AgentCandidate, ResolvedAgents};
pub use normalize::normalize_name;
pub use report::{BatchReport, ErrorCategory, RowError};
pub use resource::{
    Agent, AgentLink, AlternateIdentifier, DateType, FundingReference, GeoBox, GeoLocation,
    GeoPoint, GeoPolygon, Geometry, Institution, Person, Resource, ResourceBuilder, ResourceDate,
    ResourceKind, Size, SubjectScheme, SubjectTag, Title, TitleType,
};
pub use roles::Role;
pub use schema::{SchemaValidationReport, SchemaViolation};
pub use xml_import::xml_to_resource;
