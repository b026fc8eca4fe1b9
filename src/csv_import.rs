//! Pipe-delimited CSV batch ingestion.
//!
//! Uploads arrive as pipe-delimited CSV with a header row; column names are
//! case-sensitive keys into the mapping tables below. Each data row either
//! starts a new resource or, when it repeats an identifier already seen in
//! the batch, contributes additional agents and values to that resource —
//! that is how a `pointOfContact` row joins its collector row.
//!
//! Errors are row-scoped and accumulate: one bad row never aborts the
//! remaining rows, and a failed row is rejected whole (no partial insert).
//! Identifier collisions against already-persisted resources are hard
//! failures per row, reported with the offending row number and value.
//!
//! # Examples
//!
//! ```
//! use metanorm::csv_import::{import_csv, ImportOptions};
//!
//! let data = b"igsn|title|collector\nIGSN0001|Basalt core|Foerste, Christoph\n";
//! let outcome = import_csv(data, &ImportOptions::default());
//!
//! assert!(outcome.errors.is_empty());
//! assert_eq!(outcome.resources.len(), 1);
//! assert_eq!(outcome.resources[0].authors.len(), 1);
//! ```

use std::collections::HashSet;
use std::str::FromStr;

use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::dates;
use crate::identity::{resolve_identities, AgentCandidate};
use crate::report::{BatchReport, RowError};
use crate::resource::{
    Agent, FundingReference, GeoLocation, Geometry, GeoPoint, Person, Resource, ResourceDate,
    ResourceKind, Size, SubjectScheme, SubjectTag, Title, DateType,
};
use crate::roles::Role;

/// Identifier column (IGSN or DOI).
pub const COL_IDENTIFIER: &str = "igsn";
/// Main title column; required for every new resource.
pub const COL_TITLE: &str = "title";
/// Semicolon-delimited alternate sample names ("Other"-typed titles).
pub const COL_OTHER_TITLES: &str = "other_titles";
/// Sample type column (feeds the resourceType label).
pub const COL_SAMPLE_TYPE: &str = "sample_type";
/// Material column (feeds the resourceType label).
pub const COL_MATERIAL: &str = "material";
/// Free-text collector name, `"Family, Given"` or `"Given Family"`.
pub const COL_COLLECTOR: &str = "collector";
/// Explicit given name; takes precedence over [`COL_COLLECTOR`].
pub const COL_GIVEN_NAME: &str = "collector_given_name";
/// Explicit family name; takes precedence over [`COL_COLLECTOR`].
pub const COL_FAMILY_NAME: &str = "collector_family_name";
/// ORCID of the person on this row.
pub const COL_ORCID: &str = "collector_orcid";
/// Role label for the person on this row; defaults to collector/creator.
pub const COL_ROLE: &str = "role";
/// Contact email for the person on this row.
pub const COL_EMAIL: &str = "contact_email";
/// Contact website for the person on this row.
pub const COL_WEBSITE: &str = "contact_website";
/// Semicolon-delimited affiliations of the person on this row.
pub const COL_AFFILIATION: &str = "affiliation";
/// Collection range start (year, year-month, date, or datetime).
pub const COL_COLLECTION_START: &str = "collection_start_date";
/// Collection range end.
pub const COL_COLLECTION_END: &str = "collection_end_date";
/// Publication year.
pub const COL_PUBLICATION_YEAR: &str = "publication_year";
/// Latitude of the sampling point.
pub const COL_LATITUDE: &str = "latitude";
/// Longitude of the sampling point.
pub const COL_LONGITUDE: &str = "longitude";
/// Free-text place name.
pub const COL_PLACE: &str = "place";
/// Semicolon-delimited geological ages.
pub const COL_GEOLOGICAL_AGE: &str = "geological_age";
/// Semicolon-delimited geological units.
pub const COL_GEOLOGICAL_UNIT: &str = "geological_unit";
/// Semicolon-delimited sample classifications.
pub const COL_CLASSIFICATION: &str = "classification";
/// Identifier of the parent sample.
pub const COL_PARENT: &str = "parent_igsn";
/// Free-text comment, stored as the description.
pub const COL_COMMENT: &str = "comment";
/// Funding agency name.
pub const COL_FUNDING_AGENCY: &str = "funding_agency";
/// Funding award number.
pub const COL_FUNDING_AWARD: &str = "funding_award";
/// Publisher override.
pub const COL_PUBLISHER: &str = "publisher";
/// Version string.
pub const COL_VERSION: &str = "version";

/// Size columns: (column name, unit, type label). The unit/type pair comes
/// from the header, never from the value; cell values are semicolon lists
/// of numbers.
pub const SIZE_COLUMNS: &[(&str, &str, &str)] = &[
    ("mass_in_g", "g", "Mass"),
    ("length_in_cm", "cm", "Length"),
    ("volume_in_ml", "ml", "Volume"),
    ("diameter_in_cm", "cm", "Diameter"),
    ("depth_in_m", "m", "Depth"),
];

/// Options for a CSV import batch.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Identifiers of already-persisted resources; a row colliding with one
    /// of these is rejected whole.
    pub existing_identifiers: HashSet<String>,
}

/// Result of a CSV import batch: successfully built resources plus all
/// accumulated row errors.
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    /// Resources built from accepted rows, in first-seen order
    pub resources: Vec<Resource>,
    /// Row-scoped errors from rejected rows
    pub errors: Vec<RowError>,
}

impl ImportOutcome {
    /// Build the structured client report for this outcome.
    #[must_use]
    pub fn report(&self, filename: Option<String>) -> BatchReport {
        if self.errors.is_empty() {
            BatchReport::success(
                format!("{} resource(s) imported", self.resources.len()),
                filename,
            )
        } else {
            BatchReport::failure(
                format!(
                    "{} resource(s) imported, {} row(s) rejected",
                    self.resources.len(),
                    self.errors.len()
                ),
                filename,
                self.errors.clone(),
            )
        }
    }
}

/// A resource being assembled across one or more batch rows.
#[derive(Debug)]
struct Draft {
    resource: Resource,
    candidates: Vec<AgentCandidate>,
}

/// Import a pipe-delimited CSV batch into resource graphs.
///
/// The byte slice is decoded as UTF-8, falling back to Windows-1252 for
/// legacy uploads. Rows are processed independently; see the module
/// documentation for error semantics.
#[must_use]
pub fn import_csv(bytes: &[u8], options: &ImportOptions) -> ImportOutcome {
    let text = decode(bytes);
    let mut outcome = ImportOutcome::default();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(str::to_string).collect(),
        Err(error) => {
            outcome
                .errors
                .push(RowError::malformed_input(None, error.to_string()));
            return outcome;
        },
    };

    // Keyed drafts merge rows sharing an identifier; anonymous rows each
    // stand alone
    let mut keyed: IndexMap<String, Draft> = IndexMap::new();
    let mut anonymous: Vec<Draft> = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let row_number = index + 1;
        let record = match record {
            Ok(record) => record,
            Err(error) => {
                outcome
                    .errors
                    .push(RowError::malformed_input(Some(row_number), error.to_string()));
                continue;
            },
        };

        let row = Row {
            headers: &headers,
            record: &record,
            number: row_number,
        };
        ingest_row(&row, options, &mut keyed, &mut anonymous, &mut outcome.errors);
    }

    outcome.resources = keyed
        .into_values()
        .chain(anonymous)
        .map(finalize_draft)
        .collect();

    tracing::debug!(
        resources = outcome.resources.len(),
        errors = outcome.errors.len(),
        "csv batch ingested"
    );
    outcome
}

/// Decode uploaded bytes as UTF-8, falling back to Windows-1252.
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        },
    }
}

/// One data row with header-keyed access.
struct Row<'a> {
    headers: &'a [String],
    record: &'a csv::StringRecord,
    number: usize,
}

impl Row<'_> {
    /// Trimmed, non-empty cell value for a column, if the column exists.
    fn get(&self, column: &str) -> Option<&str> {
        let index = self.headers.iter().position(|h| h == column)?;
        let value = self.record.get(index)?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// Process one row: validate everything first, then commit. A row that
/// produced any error is rejected whole.
fn ingest_row(
    row: &Row<'_>,
    options: &ImportOptions,
    keyed: &mut IndexMap<String, Draft>,
    anonymous: &mut Vec<Draft>,
    errors: &mut Vec<RowError>,
) {
    let identifier = row.get(COL_IDENTIFIER).map(str::to_string);

    if let Some(id) = identifier.as_deref() {
        if options.existing_identifiers.contains(id) {
            errors.push(RowError::duplicate_identifier(row.number, id));
            return;
        }
    }

    let continues_batch_resource = identifier
        .as_deref()
        .is_some_and(|id| keyed.contains_key(id));

    let mut row_errors: Vec<RowError> = Vec::new();

    // Person appearing on this row, if any
    let candidate = parse_candidate(row);

    // Multi-valued additions allowed on any row for the same resource
    let other_titles: Vec<Title> = split_multi(row.get(COL_OTHER_TITLES))
        .into_iter()
        .map(Title::other)
        .collect();
    let subjects = parse_subjects(row);
    let sizes = parse_sizes(row, &mut row_errors);

    let mut new_resource = None;
    if !continues_batch_resource {
        match parse_resource(row, identifier.as_deref(), &mut row_errors) {
            Some(resource) => new_resource = Some(resource),
            None => {
                errors.append(&mut row_errors);
                return;
            },
        }
    }

    if !row_errors.is_empty() {
        errors.append(&mut row_errors);
        return;
    }

    let additions = RowAdditions {
        candidate,
        other_titles,
        subjects,
        sizes,
    };

    if let Some(resource) = new_resource {
        let mut draft = Draft {
            resource,
            candidates: Vec::new(),
        };
        additions.apply(&mut draft);
        match identifier {
            Some(id) => {
                keyed.insert(id, draft);
            },
            None => anonymous.push(draft),
        }
    } else if let Some(draft) = identifier.as_deref().and_then(|id| keyed.get_mut(id)) {
        additions.apply(draft);
    }
}

/// Values a row may contribute to its resource, whether the row starts the
/// resource or continues one seen earlier in the batch.
#[derive(Debug)]
struct RowAdditions {
    candidate: Option<AgentCandidate>,
    other_titles: Vec<Title>,
    subjects: Vec<SubjectTag>,
    sizes: Vec<Size>,
}

impl RowAdditions {
    fn apply(self, draft: &mut Draft) {
        if let Some(candidate) = self.candidate {
            draft.candidates.push(candidate);
        }
        draft.resource.titles.extend(self.other_titles);
        draft.resource.subjects.extend(self.subjects);
        draft.resource.sizes.extend(self.sizes);
    }
}

/// Parse the per-resource scalar fields of a row. Returns `None` when the
/// row must be rejected; the reasons are appended to `row_errors`.
fn parse_resource(
    row: &Row<'_>,
    identifier: Option<&str>,
    row_errors: &mut Vec<RowError>,
) -> Option<Resource> {
    let mut resource = Resource::new(ResourceKind::PhysicalSample);
    resource.identifier = identifier.map(str::to_string);

    match row.get(COL_TITLE) {
        Some(title) => resource.titles.push(Title::main(title)),
        None => {
            row_errors.push(RowError::missing_required_field(
                row.number,
                identifier,
                COL_TITLE,
            ));
        },
    }

    resource.sample_type = row.get(COL_SAMPLE_TYPE).map(str::to_string);
    resource.material = row.get(COL_MATERIAL).map(str::to_string);
    resource.publisher = row.get(COL_PUBLISHER).map(str::to_string);
    resource.version = row.get(COL_VERSION).map(str::to_string);
    resource.description = row.get(COL_COMMENT).map(str::to_string);
    resource.parent_identifier = row.get(COL_PARENT).map(str::to_string);

    if let Some(raw) = row.get(COL_PUBLICATION_YEAR) {
        match raw.parse::<i32>() {
            Ok(year) => resource.publication_year = Some(year),
            Err(_) => row_errors.push(RowError::malformed_input(
                Some(row.number),
                format!("unparseable publication year '{raw}'"),
            )),
        }
    }

    if let Some(date) = parse_collection_date(row, identifier, row_errors) {
        resource.dates.push(date);
    }

    if let Some(location) = parse_location(row, row_errors) {
        resource.geo_locations.push(location);
    }

    if let Some(funder) = row.get(COL_FUNDING_AGENCY) {
        resource.funding_references.push(FundingReference {
            funder_name: funder.to_string(),
            award_number: row.get(COL_FUNDING_AWARD).map(str::to_string),
            award_title: None,
        });
    }

    if row_errors.is_empty() {
        Some(resource)
    } else {
        None
    }
}

/// Resolve the collection date range of a row, rejecting unresolvable
/// components.
fn parse_collection_date(
    row: &Row<'_>,
    identifier: Option<&str>,
    row_errors: &mut Vec<RowError>,
) -> Option<ResourceDate> {
    let mut endpoint = |column: &str, end_of_range: bool| -> Option<String> {
        let raw = row.get(column)?;
        match dates::resolve_granular(raw, end_of_range) {
            Some(resolved) => Some(resolved),
            None => {
                row_errors.push(RowError::invalid_date(row.number, identifier, column, raw));
                None
            },
        }
    };

    let start = endpoint(COL_COLLECTION_START, false);
    let end = endpoint(COL_COLLECTION_END, true);

    if start.is_none() && end.is_none() {
        None
    } else {
        Some(ResourceDate::new(DateType::Collected, start, end))
    }
}

/// Parse latitude/longitude/place into at most one location.
fn parse_location(row: &Row<'_>, row_errors: &mut Vec<RowError>) -> Option<GeoLocation> {
    let mut coordinate = |column: &str| -> Option<f64> {
        let raw = row.get(column)?;
        match raw.parse::<f64>() {
            Ok(value) => Some(value),
            Err(_) => {
                row_errors.push(RowError::malformed_input(
                    Some(row.number),
                    format!("unparseable coordinate '{raw}' in '{column}'"),
                ));
                None
            },
        }
    };

    let latitude = coordinate(COL_LATITUDE);
    let longitude = coordinate(COL_LONGITUDE);
    let place = row.get(COL_PLACE).map(str::to_string);

    let geometry = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Geometry::Point(GeoPoint {
            latitude,
            longitude,
        })),
        (Some(_), None) | (None, Some(_)) => {
            if row.get(COL_LATITUDE).is_some() != row.get(COL_LONGITUDE).is_some() {
                row_errors.push(RowError::malformed_input(
                    Some(row.number),
                    "latitude and longitude must be given together".to_string(),
                ));
            }
            None
        },
        (None, None) => None,
    };

    let location = GeoLocation { place, geometry };
    if location.is_empty() {
        None
    } else {
        Some(location)
    }
}

/// Parse the person appearing on this row, if any name data is present.
///
/// Explicit given/family columns take precedence over the free-text
/// collector column; the free-text form splits on `"Family, Given"` when a
/// comma is present, else the first token is the given name and the
/// remainder the family name.
fn parse_candidate(row: &Row<'_>) -> Option<AgentCandidate> {
    let explicit_given = row.get(COL_GIVEN_NAME).map(str::to_string);
    let explicit_family = row.get(COL_FAMILY_NAME).map(str::to_string);
    let free_text = row.get(COL_COLLECTOR);

    let (given, family) = if explicit_given.is_some() || explicit_family.is_some() {
        (explicit_given, explicit_family)
    } else {
        split_free_text_name(free_text?)
    };

    if given.is_none() && family.is_none() {
        return None;
    }

    let mut person = Person::new(given, family);
    person.orcid = row.get(COL_ORCID).map(str::to_string);
    person.affiliations = split_multi(row.get(COL_AFFILIATION));

    let role = row
        .get(COL_ROLE)
        .map_or(Role::Creator, Role::from_label);

    let mut candidate = AgentCandidate::new(Agent::Person(person), role);
    candidate.email = row.get(COL_EMAIL).map(str::to_string);
    candidate.website = row.get(COL_WEBSITE).map(str::to_string);
    Some(candidate)
}

/// Split a free-text name into (given, family).
fn split_free_text_name(raw: &str) -> (Option<String>, Option<String>) {
    if let Some((family, given)) = raw.split_once(',') {
        let family = family.trim();
        let given = given.trim();
        (
            (!given.is_empty()).then(|| given.to_string()),
            (!family.is_empty()).then(|| family.to_string()),
        )
    } else {
        let mut tokens = raw.split_whitespace();
        let given = tokens.next().map(str::to_string);
        let family = {
            let rest = tokens.collect::<Vec<_>>().join(" ");
            (!rest.is_empty()).then_some(rest)
        };
        (given, family)
    }
}

/// Geological classification tags of a row, in column then token order.
fn parse_subjects(row: &Row<'_>) -> Vec<SubjectTag> {
    let mut subjects = Vec::new();
    for (column, scheme) in [
        (COL_GEOLOGICAL_AGE, SubjectScheme::GeologicalAge),
        (COL_GEOLOGICAL_UNIT, SubjectScheme::GeologicalUnit),
        (COL_CLASSIFICATION, SubjectScheme::Classification),
    ] {
        for value in split_multi(row.get(column)) {
            subjects.push(SubjectTag { value, scheme });
        }
    }
    subjects
}

/// Size entries of a row, one per semicolon-delimited token, with the
/// unit/type pair taken from the column header.
fn parse_sizes(row: &Row<'_>, row_errors: &mut Vec<RowError>) -> Vec<Size> {
    let mut sizes = Vec::new();
    for (column, unit, label) in SIZE_COLUMNS {
        for token in split_multi(row.get(column)) {
            match Decimal::from_str(&token) {
                Ok(mut value) => {
                    value.rescale(4);
                    sizes.push(Size {
                        value,
                        unit: (*unit).to_string(),
                        label: (*label).to_string(),
                    });
                },
                Err(_) => row_errors.push(RowError::malformed_input(
                    Some(row.number),
                    format!("unparseable size '{token}' in '{column}'"),
                )),
            }
        }
    }
    sizes
}

/// Split a semicolon-delimited cell into trimmed, non-empty tokens,
/// preserving input order.
fn split_multi(raw: Option<&str>) -> Vec<String> {
    raw.map_or_else(Vec::new, |value| {
        value
            .split(';')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    })
}

/// Run identity resolution and finish a draft.
fn finalize_draft(draft: Draft) -> Resource {
    let mut resource = draft.resource;
    let resolved = resolve_identities(draft.candidates);
    resource.authors = resolved.authors;
    resource.contributors = resolved.contributors;
    resource
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(data: &str) -> ImportOutcome {
        import_csv(data.as_bytes(), &ImportOptions::default())
    }

    #[test]
    fn test_single_row_with_collector() {
        let outcome = import("igsn|title|collector\nIGSN0001|Basalt core|Foerste, Christoph\n");
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.resources.len(), 1);

        let resource = &outcome.resources[0];
        assert_eq!(resource.identifier.as_deref(), Some("IGSN0001"));
        assert_eq!(resource.authors.len(), 1);
        assert_eq!(
            resource.authors[0].agent.display_name(),
            "Foerste, Christoph"
        );
    }

    #[test]
    fn test_contact_row_merges_into_collector_row() {
        let data = "igsn|title|collector|role|contact_email\n\
                    IGSN001|Title1|Foerste, Christoph|collector|\n\
                    IGSN001||Förste, Christoph|pointOfContact|foerste@example.org\n";
        let outcome = import(data);

        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.resources.len(), 1);

        let resource = &outcome.resources[0];
        assert_eq!(resource.authors.len(), 1);
        assert!(resource.authors[0].is_contact);
        assert_eq!(
            resource.authors[0].email.as_deref(),
            Some("foerste@example.org")
        );
        assert!(resource.contributors.is_empty());
    }

    #[test]
    fn test_explicit_name_columns_take_precedence() {
        let data = "igsn|title|collector|collector_given_name|collector_family_name\n\
                    IGSN0002|T|Wrong, Name|Maria|Weber\n";
        let outcome = import(data);
        assert_eq!(
            outcome.resources[0].authors[0].agent.display_name(),
            "Weber, Maria"
        );
    }

    #[test]
    fn test_free_text_without_comma() {
        let data = "igsn|title|collector\nIGSN0003|T|Maria Anna Weber\n";
        let outcome = import(data);
        let Agent::Person(person) = &outcome.resources[0].authors[0].agent else {
            panic!("expected a person");
        };
        assert_eq!(person.given_name.as_deref(), Some("Maria"));
        assert_eq!(person.family_name.as_deref(), Some("Anna Weber"));
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let mut options = ImportOptions::default();
        options.existing_identifiers.insert("IGSN0001".to_string());

        let data = "igsn|title|collector\nIGSN0001|T|A, B\nIGSN0002|U|C, D\n";
        let outcome = import_csv(data.as_bytes(), &options);

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].code, "duplicate_igsn");
        assert_eq!(outcome.errors[0].row, Some(1));
        assert_eq!(outcome.errors[0].identifier.as_deref(), Some("IGSN0001"));
        // The other row still succeeds
        assert_eq!(outcome.resources.len(), 1);
        assert_eq!(outcome.resources[0].identifier.as_deref(), Some("IGSN0002"));
    }

    #[test]
    fn test_missing_title_aborts_row_only() {
        let data = "igsn|title|collector\nIGSN0001||A, B\nIGSN0002|U|C, D\n";
        let outcome = import(data);

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].code, "missing_required_field");
        assert_eq!(outcome.errors[0].context.as_deref(), Some("title"));
        assert_eq!(outcome.resources.len(), 1);
    }

    #[test]
    fn test_invalid_date_component_rejected() {
        let data = "igsn|title|collection_start_date\nIGSN0001|T|2024-13\n";
        let outcome = import(data);

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].code, "invalid_date");
        assert!(outcome.resources.is_empty());
    }

    #[test]
    fn test_collection_range_resolved() {
        let data =
            "igsn|title|collection_start_date|collection_end_date\nIGSN0001|T|2020|2020-02\n";
        let outcome = import(data);

        let date = &outcome.resources[0].dates[0];
        assert_eq!(date.date_type, DateType::Collected);
        assert_eq!(date.start.as_deref(), Some("2020-01-01"));
        assert_eq!(date.end.as_deref(), Some("2020-02-29"));
    }

    #[test]
    fn test_sizes_split_with_header_units() {
        let data = "igsn|title|mass_in_g|length_in_cm\nIGSN0001|T|12.5; 3|8.25\n";
        let outcome = import(data);

        let sizes = &outcome.resources[0].sizes;
        assert_eq!(sizes.len(), 3);
        // Four fractional digits, fixed
        assert_eq!(sizes[0].value.to_string(), "12.5000");
        assert_eq!(sizes[0].unit, "g");
        assert_eq!(sizes[0].label, "Mass");
        assert_eq!(sizes[1].value.to_string(), "3.0000");
        assert_eq!(sizes[2].unit, "cm");
        assert_eq!(sizes[2].label, "Length");
    }

    #[test]
    fn test_multi_valued_fields_preserve_order() {
        let data = "igsn|title|geological_age|classification\n\
                    IGSN0001|T|Jurassic; Cretaceous|igneous>volcanic\n";
        let outcome = import(data);

        let subjects = &outcome.resources[0].subjects;
        assert_eq!(subjects.len(), 3);
        assert_eq!(subjects[0].value, "Jurassic");
        assert_eq!(subjects[0].scheme, SubjectScheme::GeologicalAge);
        assert_eq!(subjects[1].value, "Cretaceous");
        assert_eq!(subjects[2].scheme, SubjectScheme::Classification);
    }

    #[test]
    fn test_other_titles_become_other_typed() {
        let data = "igsn|title|other_titles\nIGSN0001|Main|Field-7; Alt-2\n";
        let outcome = import(data);

        let resource = &outcome.resources[0];
        assert_eq!(resource.other_titles().count(), 2);
        assert_eq!(resource.alternate_identifiers().len(), 2);
    }

    #[test]
    fn test_point_location_with_place() {
        let data = "igsn|title|latitude|longitude|place\nIGSN0001|T|52.38|13.06|Potsdam\n";
        let outcome = import(data);

        let location = &outcome.resources[0].geo_locations[0];
        assert_eq!(location.place.as_deref(), Some("Potsdam"));
        match location.geometry {
            Some(Geometry::Point(point)) => {
                assert!((point.latitude - 52.38).abs() < f64::EPSILON);
                assert!((point.longitude - 13.06).abs() < f64::EPSILON);
            },
            _ => panic!("expected a point"),
        }
    }

    #[test]
    fn test_lone_latitude_is_malformed() {
        let data = "igsn|title|latitude\nIGSN0001|T|52.38\n";
        let outcome = import(data);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].code, "malformed_input");
    }

    #[test]
    fn test_windows_1252_fallback() {
        // "Förste" in Windows-1252: F=0x46 ö=0xF6 ...
        let mut data = b"igsn|title|collector\nIGSN0001|T|F".to_vec();
        data.push(0xF6);
        data.extend_from_slice(b"rste, Christoph\n");

        let outcome = import_csv(&data, &ImportOptions::default());
        assert!(outcome.errors.is_empty());
        assert_eq!(
            outcome.resources[0].authors[0].agent.display_name(),
            "Förste, Christoph"
        );
    }

    #[test]
    fn test_report_shapes() {
        let ok = import("igsn|title\nIGSN0001|T\n").report(Some("upload.csv".to_string()));
        assert!(ok.success);

        let bad = import("igsn|title\nIGSN0001|\n").report(None);
        assert!(!bad.success);
        assert_eq!(bad.errors.len(), 1);
    }
}
