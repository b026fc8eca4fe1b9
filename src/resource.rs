//! Resource graph structures and operations.
//!
//! This module provides the core types for working with curated
//! bibliographic/sample records:
//! - [`Resource`] — the record with its owned collections
//! - [`Agent`] — a person or institution appearing as creator/contributor
//! - [`AgentLink`] — a creator/contributor link carrying position, roles,
//!   and contact metadata
//! - [`ResourceDate`], [`GeoLocation`], [`Size`], [`Title`],
//!   [`FundingReference`], [`SubjectTag`] — owned collection entries
//!
//! Collections are ordered: the order in which entries were ingested is the
//! order in which they serialize, for round-trip fidelity.
//!
//! # Examples
//!
//! Create a resource with the builder API:
//!
//! ```
//! use metanorm::{Resource, ResourceKind, Title};
//!
//! let resource = Resource::builder(ResourceKind::PhysicalSample)
//!     .identifier("IGSN0001")
//!     .title(Title::main("Basalt core, site 12"))
//!     .sample_type("Core")
//!     .material("Basalt")
//!     .build();
//!
//! assert_eq!(resource.main_title(), Some("Basalt core, site 12"));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::normalize::{collapse_whitespace, normalize_name};
use crate::roles::Role;

/// Fixed type label attached to alternate identifiers derived from
/// "Other"-typed titles of sample resources.
pub const ALTERNATE_IDENTIFIER_TYPE: &str = "AlternateName";

/// Classification of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    /// A physical sample, identified by IGSN
    PhysicalSample,
    /// A dataset, identified by DOI
    Dataset,
}

/// A curated bibliographic/sample record with its owned collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Internal id assigned by the persistence collaborator, if any.
    /// Used only for the export filename fallback.
    pub id: Option<i64>,
    /// IGSN or DOI string
    pub identifier: Option<String>,
    /// Resource classification
    pub kind: ResourceKind,
    /// Sample type (e.g. "Core"), feeds the resourceType label
    pub sample_type: Option<String>,
    /// Material (e.g. "Basalt"), feeds the resourceType label
    pub material: Option<String>,
    /// Publishing institution
    pub publisher: Option<String>,
    /// Year of publication
    pub publication_year: Option<i32>,
    /// Version string
    pub version: Option<String>,
    /// Free-text description (exported as an Abstract)
    pub description: Option<String>,
    /// Identifier of the parent sample, if this is a subsample
    pub parent_identifier: Option<String>,
    /// Titles in ingestion order; the first Main title is the display title
    pub titles: Vec<Title>,
    /// Date entries in ingestion order
    pub dates: Vec<ResourceDate>,
    /// Authors (creators) in position order
    pub authors: Vec<AgentLink>,
    /// Contributors in position order
    pub contributors: Vec<AgentLink>,
    /// Geographic locations in ingestion order
    pub geo_locations: Vec<GeoLocation>,
    /// Physical size entries in ingestion order
    pub sizes: Vec<Size>,
    /// Funding references in ingestion order
    pub funding_references: Vec<FundingReference>,
    /// Domain classification tags (geological age/unit/classification)
    pub subjects: Vec<SubjectTag>,
}

impl Resource {
    /// Create an empty resource of the given kind.
    #[must_use]
    pub fn new(kind: ResourceKind) -> Self {
        Resource {
            id: None,
            identifier: None,
            kind,
            sample_type: None,
            material: None,
            publisher: None,
            publication_year: None,
            version: None,
            description: None,
            parent_identifier: None,
            titles: Vec::new(),
            dates: Vec::new(),
            authors: Vec::new(),
            contributors: Vec::new(),
            geo_locations: Vec::new(),
            sizes: Vec::new(),
            funding_references: Vec::new(),
            subjects: Vec::new(),
        }
    }

    /// Create a builder for fluently constructing resources.
    #[must_use]
    pub fn builder(kind: ResourceKind) -> ResourceBuilder {
        ResourceBuilder {
            resource: Resource::new(kind),
        }
    }

    /// The first Main-typed title, if any.
    #[must_use]
    pub fn main_title(&self) -> Option<&str> {
        self.titles
            .iter()
            .find(|t| t.title_type == TitleType::Main)
            .map(|t| t.value.as_str())
    }

    /// Titles typed "Other", in order.
    pub fn other_titles(&self) -> impl Iterator<Item = &Title> {
        self.titles
            .iter()
            .filter(|t| t.title_type == TitleType::Other)
    }

    /// Alternate identifiers derived from "Other"-typed titles.
    ///
    /// Generated only for sample-type resources; a dataset keeps its
    /// "Other" titles as plain titles and yields nothing here.
    #[must_use]
    pub fn alternate_identifiers(&self) -> Vec<AlternateIdentifier> {
        if self.kind != ResourceKind::PhysicalSample {
            return Vec::new();
        }
        self.other_titles()
            .map(|t| AlternateIdentifier {
                value: t.value.clone(),
                type_label: ALTERNATE_IDENTIFIER_TYPE.to_string(),
            })
            .collect()
    }

    /// Compose the free-text resourceType label from sample type and material.
    ///
    /// Both present yields `"Type: Material"`; one present yields that one;
    /// neither yields the generic fallback `"Physical Object"`.
    #[must_use]
    pub fn resource_type_label(&self) -> String {
        match (self.sample_type.as_deref(), self.material.as_deref()) {
            (Some(t), Some(m)) => format!("{t}: {m}"),
            (Some(t), None) => t.to_string(),
            (None, Some(m)) => m.to_string(),
            (None, None) => "Physical Object".to_string(),
        }
    }

    /// Invert [`Resource::resource_type_label`]: `"Type: Material"` splits
    /// into both fields, a single part becomes the sample type, and the
    /// generic fallback label sets neither.
    pub fn apply_resource_type_label(&mut self, label: &str) {
        let label = label.trim();
        if label.is_empty() || label == "Physical Object" {
            return;
        }
        match label.split_once(": ") {
            Some((sample_type, material)) => {
                self.sample_type = Some(sample_type.to_string());
                self.material = Some(material.to_string());
            },
            None => self.sample_type = Some(label.to_string()),
        }
    }
}

/// Builder for fluently constructing [`Resource`] values.
#[derive(Debug)]
pub struct ResourceBuilder {
    resource: Resource,
}

impl ResourceBuilder {
    /// Set the IGSN/DOI identifier.
    #[must_use]
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.resource.identifier = Some(identifier.into());
        self
    }

    /// Set the internal persistence id.
    #[must_use]
    pub fn id(mut self, id: i64) -> Self {
        self.resource.id = Some(id);
        self
    }

    /// Add a title.
    #[must_use]
    pub fn title(mut self, title: Title) -> Self {
        self.resource.titles.push(title);
        self
    }

    /// Set the sample type.
    #[must_use]
    pub fn sample_type(mut self, sample_type: impl Into<String>) -> Self {
        self.resource.sample_type = Some(sample_type.into());
        self
    }

    /// Set the material.
    #[must_use]
    pub fn material(mut self, material: impl Into<String>) -> Self {
        self.resource.material = Some(material.into());
        self
    }

    /// Set the publisher.
    #[must_use]
    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.resource.publisher = Some(publisher.into());
        self
    }

    /// Set the publication year.
    #[must_use]
    pub fn publication_year(mut self, year: i32) -> Self {
        self.resource.publication_year = Some(year);
        self
    }

    /// Set the version string.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.resource.version = Some(version.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.resource.description = Some(description.into());
        self
    }

    /// Add a date entry.
    #[must_use]
    pub fn date(mut self, date: ResourceDate) -> Self {
        self.resource.dates.push(date);
        self
    }

    /// Add an author link.
    #[must_use]
    pub fn author(mut self, link: AgentLink) -> Self {
        self.resource.authors.push(link);
        self
    }

    /// Add a contributor link.
    #[must_use]
    pub fn contributor(mut self, link: AgentLink) -> Self {
        self.resource.contributors.push(link);
        self
    }

    /// Add a geographic location.
    #[must_use]
    pub fn geo_location(mut self, location: GeoLocation) -> Self {
        self.resource.geo_locations.push(location);
        self
    }

    /// Add a size entry.
    #[must_use]
    pub fn size(mut self, size: Size) -> Self {
        self.resource.sizes.push(size);
        self
    }

    /// Add a funding reference.
    #[must_use]
    pub fn funding_reference(mut self, funding: FundingReference) -> Self {
        self.resource.funding_references.push(funding);
        self
    }

    /// Add a subject tag.
    #[must_use]
    pub fn subject(mut self, subject: SubjectTag) -> Self {
        self.resource.subjects.push(subject);
        self
    }

    /// Finish building the resource.
    #[must_use]
    pub fn build(self) -> Resource {
        self.resource
    }
}

/// A title with its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    /// Display string
    pub value: String,
    /// Title type
    pub title_type: TitleType,
}

impl Title {
    /// Create a Main-typed title.
    #[must_use]
    pub fn main(value: impl Into<String>) -> Self {
        Title {
            value: value.into(),
            title_type: TitleType::Main,
        }
    }

    /// Create an Other-typed title (alternate sample name).
    #[must_use]
    pub fn other(value: impl Into<String>) -> Self {
        Title {
            value: value.into(),
            title_type: TitleType::Other,
        }
    }
}

/// Title type vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitleType {
    /// Primary display title
    Main,
    /// Alternative title
    AlternativeTitle,
    /// Subtitle
    Subtitle,
    /// Translated title
    TranslatedTitle,
    /// Other; source of derived alternate identifiers on samples
    Other,
}

impl TitleType {
    /// Parse a DataCite titleType attribute; an absent attribute is Main.
    #[must_use]
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            None | Some("") => TitleType::Main,
            Some(l) => match l.to_lowercase().as_str() {
                "alternativetitle" => TitleType::AlternativeTitle,
                "subtitle" => TitleType::Subtitle,
                "translatedtitle" => TitleType::TranslatedTitle,
                _ => TitleType::Other,
            },
        }
    }

    /// The DataCite titleType attribute value; Main has none.
    #[must_use]
    pub fn label(&self) -> Option<&'static str> {
        match self {
            TitleType::Main => None,
            TitleType::AlternativeTitle => Some("AlternativeTitle"),
            TitleType::Subtitle => Some("Subtitle"),
            TitleType::TranslatedTitle => Some("TranslatedTitle"),
            TitleType::Other => Some("Other"),
        }
    }
}

/// A (date-type, start, end) triple with open-ended endpoints allowed.
///
/// The stored strings keep the granularity they were ingested with; they
/// are not normalized to a fixed format and round-trip through export
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDate {
    /// Date type
    pub date_type: DateType,
    /// Range start, or `None` for an open start
    pub start: Option<String>,
    /// Range end, or `None` for an open end
    pub end: Option<String>,
}

impl ResourceDate {
    /// Create a date entry.
    #[must_use]
    pub fn new(date_type: DateType, start: Option<String>, end: Option<String>) -> Self {
        ResourceDate {
            date_type,
            start,
            end,
        }
    }
}

/// DataCite date type vocabulary (subset used by the curation domain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateType {
    /// Date of collection of the sample/data
    Collected,
    /// Date the resource was created
    Created,
    /// Date the resource was issued/published
    Issued,
    /// Date the resource became available
    Available,
    /// Date of last update
    Updated,
    /// Date the resource was submitted
    Submitted,
    /// Date range during which the resource is accurate
    Valid,
    /// Any other date
    Other,
}

impl DateType {
    /// Parse a DataCite dateType attribute; unrecognized becomes Other.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "collected" => DateType::Collected,
            "created" => DateType::Created,
            "issued" => DateType::Issued,
            "available" => DateType::Available,
            "updated" => DateType::Updated,
            "submitted" => DateType::Submitted,
            "valid" => DateType::Valid,
            _ => DateType::Other,
        }
    }

    /// The DataCite dateType attribute value.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            DateType::Collected => "Collected",
            DateType::Created => "Created",
            DateType::Issued => "Issued",
            DateType::Available => "Available",
            DateType::Updated => "Updated",
            DateType::Submitted => "Submitted",
            DateType::Valid => "Valid",
            DateType::Other => "Other",
        }
    }
}

/// A person or institution (tagged variant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Agent {
    /// A natural person with given/family name and optional ORCID
    Person(Person),
    /// An institution with a name and optional ROR identifier
    Institution(Institution),
}

impl Agent {
    /// The display name of this agent (`"Family, Given"` for people).
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Agent::Person(p) => p.display_name(),
            Agent::Institution(i) => i.name.clone(),
        }
    }

    /// The identity comparison key for this agent.
    ///
    /// People fold through [`normalize_name`]; institutions collapse
    /// whitespace and lower-case, keeping punctuation intact.
    #[must_use]
    pub fn identity_key(&self) -> String {
        match self {
            Agent::Person(p) => normalize_name(&p.display_name()),
            Agent::Institution(i) => collapse_whitespace(&i.name).to_lowercase(),
        }
    }

    /// The persistent identifier carried by this agent (ORCID or ROR).
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Agent::Person(p) => p.orcid.as_deref(),
            Agent::Institution(i) => i.ror.as_deref(),
        }
    }
}

/// A natural person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Given name(s)
    pub given_name: Option<String>,
    /// Family name
    pub family_name: Option<String>,
    /// ORCID identifier, bare form (`0000-0002-1825-0097`)
    pub orcid: Option<String>,
    /// Affiliation names in ingestion order
    pub affiliations: Vec<String>,
}

impl Person {
    /// Create a person from name parts.
    #[must_use]
    pub fn new(given_name: Option<String>, family_name: Option<String>) -> Self {
        Person {
            given_name,
            family_name,
            orcid: None,
            affiliations: Vec::new(),
        }
    }

    /// Display name built as `"Family, Given"`, or whichever part exists.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (self.family_name.as_deref(), self.given_name.as_deref()) {
            (Some(f), Some(g)) => format!("{f}, {g}"),
            (Some(f), None) => f.to_string(),
            (None, Some(g)) => g.to_string(),
            (None, None) => String::new(),
        }
    }
}

/// An institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    /// Institution name
    pub name: String,
    /// ROR identifier, if known
    pub ror: Option<String>,
}

impl Institution {
    /// Create an institution from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Institution {
            name: name.into(),
            ror: None,
        }
    }
}

/// A creator/contributor link.
///
/// The agent is shared by identity across links, but each link carries its
/// own position, accumulated roles, and contact metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentLink {
    /// The linked agent
    pub agent: Agent,
    /// Zero-based position within the creator or contributor list
    pub position: usize,
    /// Accumulated roles, first-seen order, de-duplicated
    pub roles: SmallVec<[Role; 4]>,
    /// Contact email, if this link carries contact metadata
    pub email: Option<String>,
    /// Contact website
    pub website: Option<String>,
    /// Whether this agent is the point of contact for the resource
    pub is_contact: bool,
}

/// A geographic location: optional place name plus at most one geometry.
///
/// Exactly one geometry variant is populated per record; the enum makes
/// mixing polygon fields with box/point fields unrepresentable. A location
/// may also carry a place name alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Free-text place name
    pub place: Option<String>,
    /// Coordinate geometry
    pub geometry: Option<Geometry>,
}

impl GeoLocation {
    /// A place-only location.
    #[must_use]
    pub fn place(name: impl Into<String>) -> Self {
        GeoLocation {
            place: Some(name.into()),
            geometry: None,
        }
    }

    /// A point location.
    #[must_use]
    pub fn point(latitude: f64, longitude: f64) -> Self {
        GeoLocation {
            place: None,
            geometry: Some(Geometry::Point(GeoPoint {
                latitude,
                longitude,
            })),
        }
    }

    /// Attach a place name.
    #[must_use]
    pub fn with_place(mut self, name: impl Into<String>) -> Self {
        self.place = Some(name.into());
        self
    }

    /// Whether the location carries neither place nor geometry.
    ///
    /// Empty locations are omitted from export entirely.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.place.is_none() && self.geometry.is_none()
    }
}

/// Coordinate geometry variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// A single point
    Point(GeoPoint),
    /// A bounding box
    BoundingBox(GeoBox),
    /// A polygon with ordered vertices and one interior point
    Polygon(GeoPolygon),
}

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

/// A bounding box with four bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    /// Western bound longitude
    pub west_longitude: f64,
    /// Eastern bound longitude
    pub east_longitude: f64,
    /// Southern bound latitude
    pub south_latitude: f64,
    /// Northern bound latitude
    pub north_latitude: f64,
}

/// A polygon: at least three ordered vertices plus one interior point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPolygon {
    /// Ordered vertex pairs
    pub vertices: Vec<GeoPoint>,
    /// A point inside the polygon, disambiguating which side is inside
    pub interior_point: Option<GeoPoint>,
}

/// A single physical size entry.
///
/// The numeric value is fixed-precision with four fractional digits; the
/// unit and type label come from the ingestion column, not the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    /// Numeric value, four fractional digits
    pub value: Decimal,
    /// Measurement unit (e.g. "cm")
    pub unit: String,
    /// Type label (e.g. "Length")
    pub label: String,
}

impl Size {
    /// Render as the exported DataCite size string, e.g. `"12.5000 g (Mass)"`.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{} {} ({})", self.value, self.unit, self.label)
    }

    /// Parse an exported size string back. Strings in any other shape
    /// yield `None` and are skipped on import.
    #[must_use]
    pub fn parse_rendered(raw: &str) -> Option<Self> {
        lazy_static::lazy_static! {
            static ref SIZE_RE: regex::Regex =
                regex::Regex::new(r"^\s*([0-9.+-]+)\s+(\S+)\s+\((.+)\)\s*$").unwrap();
        }
        let caps = SIZE_RE.captures(raw)?;
        let value: Decimal = caps[1].parse().ok()?;
        Some(Size {
            value,
            unit: caps[2].to_string(),
            label: caps[3].to_string(),
        })
    }
}

/// A funding reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingReference {
    /// Name of the funding agency
    pub funder_name: String,
    /// Award/grant number
    pub award_number: Option<String>,
    /// Award/grant title
    pub award_title: Option<String>,
}

/// A domain classification tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectTag {
    /// Tag value
    pub value: String,
    /// Which classification the tag belongs to
    pub scheme: SubjectScheme,
}

/// Classification schemes for sample subject tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectScheme {
    /// Geological age (e.g. "Jurassic")
    GeologicalAge,
    /// Geological unit (e.g. "Bunter Sandstone")
    GeologicalUnit,
    /// Sample classification (e.g. "igneous>volcanic")
    Classification,
}

impl SubjectScheme {
    /// The subjectScheme attribute value for export.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            SubjectScheme::GeologicalAge => "Geological Age",
            SubjectScheme::GeologicalUnit => "Geological Unit",
            SubjectScheme::Classification => "Classification",
        }
    }

    /// Parse a subjectScheme attribute back to a scheme.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "geological age" => Some(SubjectScheme::GeologicalAge),
            "geological unit" => Some(SubjectScheme::GeologicalUnit),
            "classification" => Some(SubjectScheme::Classification),
            _ => None,
        }
    }
}

/// An (value, type-label) alternate identifier pair.
///
/// Derived from "Other"-typed titles of sample resources at export time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateIdentifier {
    /// Identifier value
    pub value: String,
    /// Fixed type label
    pub type_label: String,
}
