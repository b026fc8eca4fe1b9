//! DataCite JSON serialization and deserialization of resource graphs.
//!
//! The export direction builds the DataCite attributes object, validates it
//! against the embedded DataCite JSON Schema, and wraps it in the
//! `{data: {type: "dois", attributes: {...}}}` envelope. Validation is
//! all-or-nothing: a schema violation returns the full path-annotated
//! report and no document.
//!
//! The import direction maps a DataCite JSON document (envelope or bare
//! attributes) back into the resource graph, routing creators and
//! contributors through the identity resolver and date strings through the
//! granular date resolver.
//!
//! # Examples
//!
//! ```ignore
//! use chrono::FixedOffset;
//! use metanorm::datacite_json::{datacite_json_to_resource, resource_to_datacite_json};
//! use metanorm::export::ExportOptions;
//!
//! let options = ExportOptions::new(FixedOffset::east_opt(0).unwrap())
//!     .with_publisher_fallback("GFZ Data Services");
//! let document = resource_to_datacite_json(&resource, &options)?;
//! let restored = datacite_json_to_resource(&document)?;
//! assert_eq!(restored.main_title(), resource.main_title());
//! # Ok::<(), metanorm::MetaError>(())
//! ```

use serde_json::{json, Map, Value};

use crate::dates;
use crate::error::{MetaError, Result};
use crate::export::ExportOptions;
use crate::identity::{resolve_identities, AgentCandidate};
use crate::resource::{
    Agent, AgentLink, DateType, FundingReference, GeoBox, GeoLocation, GeoPoint, GeoPolygon,
    Geometry, Institution, Person, Resource, ResourceDate, ResourceKind, Size, SubjectScheme,
    SubjectTag, Title, TitleType,
};
use crate::roles::Role;
use crate::schema;

/// Convert a resource graph to a validated DataCite JSON document.
///
/// # Errors
///
/// Returns [`MetaError::SchemaValidation`] with the full path-annotated
/// report when the built document violates the DataCite schema. No partial
/// document is returned.
pub fn resource_to_datacite_json(resource: &Resource, options: &ExportOptions) -> Result<Value> {
    let attributes = resource_to_datacite_attributes(resource, options);
    schema::validate_datacite(&attributes).map_err(MetaError::SchemaValidation)?;

    Ok(json!({
        "data": {
            "type": "dois",
            "attributes": attributes
        }
    }))
}

/// Build the unvalidated DataCite attributes object for a resource.
///
/// Exposed separately so callers can inspect what would be exported before
/// validation; [`resource_to_datacite_json`] is the validated entry point.
#[must_use]
pub fn resource_to_datacite_attributes(resource: &Resource, options: &ExportOptions) -> Value {
    let mut attributes = Map::new();

    if let Some(identifier) = &resource.identifier {
        if resource.kind == ResourceKind::Dataset {
            attributes.insert("doi".to_string(), json!(identifier));
        }
        attributes.insert(
            "identifiers".to_string(),
            json!([{
                "identifier": identifier,
                "identifierType": identifier_type(resource.kind)
            }]),
        );
    }

    attributes.insert(
        "creators".to_string(),
        Value::Array(resource.authors.iter().map(agent_to_json).collect()),
    );

    attributes.insert(
        "titles".to_string(),
        Value::Array(resource.titles.iter().map(title_to_json).collect()),
    );

    let publisher = resource
        .publisher
        .clone()
        .or_else(|| options.publisher_fallback.clone());
    if let Some(publisher) = publisher {
        attributes.insert("publisher".to_string(), json!(publisher));
    }

    if let Some(year) = resource.publication_year {
        attributes.insert("publicationYear".to_string(), json!(year));
    }

    attributes.insert(
        "types".to_string(),
        json!({
            "resourceType": resource.resource_type_label(),
            "resourceTypeGeneral": resource_type_general(resource.kind)
        }),
    );

    let contributors = contributors_to_json(resource);
    if !contributors.is_empty() {
        attributes.insert("contributors".to_string(), Value::Array(contributors));
    }

    let dates = dates_to_json(&resource.dates, options);
    if !dates.is_empty() {
        attributes.insert("dates".to_string(), Value::Array(dates));
    }

    let locations: Vec<Value> = resource
        .geo_locations
        .iter()
        .filter(|location| !location.is_empty())
        .map(location_to_json)
        .collect();
    if !locations.is_empty() {
        attributes.insert("geoLocations".to_string(), Value::Array(locations));
    }

    let alternates = resource.alternate_identifiers();
    if !alternates.is_empty() {
        attributes.insert(
            "alternateIdentifiers".to_string(),
            Value::Array(
                alternates
                    .iter()
                    .map(|alternate| {
                        json!({
                            "alternateIdentifier": alternate.value,
                            "alternateIdentifierType": alternate.type_label
                        })
                    })
                    .collect(),
            ),
        );
    }

    if let Some(parent) = &resource.parent_identifier {
        attributes.insert(
            "relatedIdentifiers".to_string(),
            json!([{
                "relatedIdentifier": parent,
                "relatedIdentifierType": "IGSN",
                "relationType": "IsPartOf"
            }]),
        );
    }

    if !resource.sizes.is_empty() {
        attributes.insert(
            "sizes".to_string(),
            Value::Array(resource.sizes.iter().map(size_to_json).collect()),
        );
    }

    if !resource.subjects.is_empty() {
        attributes.insert(
            "subjects".to_string(),
            Value::Array(
                resource
                    .subjects
                    .iter()
                    .map(|subject| {
                        json!({
                            "subject": subject.value,
                            "subjectScheme": subject.scheme.label()
                        })
                    })
                    .collect(),
            ),
        );
    }

    if !resource.funding_references.is_empty() {
        attributes.insert(
            "fundingReferences".to_string(),
            Value::Array(
                resource
                    .funding_references
                    .iter()
                    .map(funding_to_json)
                    .collect(),
            ),
        );
    }

    if let Some(description) = &resource.description {
        attributes.insert(
            "descriptions".to_string(),
            json!([{
                "description": description,
                "descriptionType": "Abstract"
            }]),
        );
    }

    if let Some(version) = &resource.version {
        attributes.insert("version".to_string(), json!(version));
    }

    Value::Object(attributes)
}

fn identifier_type(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::PhysicalSample => "IGSN",
        ResourceKind::Dataset => "DOI",
    }
}

fn resource_type_general(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::PhysicalSample => "PhysicalObject",
        ResourceKind::Dataset => "Dataset",
    }
}

/// Emit one agent as a DataCite creator/contributor object.
///
/// `name` is always present; `givenName`/`familyName` only when non-null.
/// People carry `nameType: Personal`, institutions `Organizational`.
/// Identifiers become a `nameIdentifiers` object list, never a flat pair.
fn agent_to_json(link: &AgentLink) -> Value {
    let mut object = Map::new();
    object.insert("name".to_string(), json!(link.agent.display_name()));

    match &link.agent {
        Agent::Person(person) => {
            object.insert("nameType".to_string(), json!("Personal"));
            if let Some(given) = &person.given_name {
                object.insert("givenName".to_string(), json!(given));
            }
            if let Some(family) = &person.family_name {
                object.insert("familyName".to_string(), json!(family));
            }
            if let Some(orcid) = &person.orcid {
                object.insert(
                    "nameIdentifiers".to_string(),
                    json!([{
                        "nameIdentifier": orcid,
                        "nameIdentifierScheme": "ORCID",
                        "schemeUri": "https://orcid.org"
                    }]),
                );
            }
            if !person.affiliations.is_empty() {
                object.insert(
                    "affiliation".to_string(),
                    Value::Array(
                        person
                            .affiliations
                            .iter()
                            .map(|name| json!({ "name": name }))
                            .collect(),
                    ),
                );
            }
        },
        Agent::Institution(institution) => {
            object.insert("nameType".to_string(), json!("Organizational"));
            if let Some(ror) = &institution.ror {
                object.insert(
                    "nameIdentifiers".to_string(),
                    json!([{
                        "nameIdentifier": ror,
                        "nameIdentifierScheme": "ROR",
                        "schemeUri": "https://ror.org"
                    }]),
                );
            }
        },
    }

    Value::Object(object)
}

/// Contributor entries: stored contributors first (one entry per link,
/// tagged with its first role), then a ContactPerson entry for each
/// contact-flagged author so contact status survives the round trip.
fn contributors_to_json(resource: &Resource) -> Vec<Value> {
    let mut entries = Vec::new();

    for link in &resource.contributors {
        let role = link.roles.first().copied().unwrap_or(Role::Other);
        let mut object = agent_to_json(link);
        if let Some(map) = object.as_object_mut() {
            map.insert("contributorType".to_string(), json!(role.label()));
        }
        entries.push(object);
    }

    for link in resource.authors.iter().filter(|link| link.is_contact) {
        let mut object = agent_to_json(link);
        if let Some(map) = object.as_object_mut() {
            map.insert(
                "contributorType".to_string(),
                json!(Role::ContactPerson.label()),
            );
        }
        entries.push(object);
    }

    entries
}

fn title_to_json(title: &Title) -> Value {
    match title.title_type.label() {
        Some(label) => json!({ "title": title.value, "titleType": label }),
        None => json!({ "title": title.value }),
    }
}

/// One exported entry per stored date, rendered through the range rule.
/// A date whose endpoints are both absent is skipped rather than emitted
/// empty.
fn dates_to_json(stored: &[ResourceDate], options: &ExportOptions) -> Vec<Value> {
    stored
        .iter()
        .filter_map(|date| {
            let rendered = dates::render_range(
                date.start.as_deref(),
                date.end.as_deref(),
                options.timezone_fallback,
            )?;
            Some(json!({
                "date": rendered,
                "dateType": date.date_type.label()
            }))
        })
        .collect()
}

/// Emit exactly one coordinate variant per stored location, mirroring the
/// stored geometry; the place name coexists independently.
fn location_to_json(location: &GeoLocation) -> Value {
    let mut object = Map::new();

    if let Some(place) = &location.place {
        object.insert("geoLocationPlace".to_string(), json!(place));
    }

    match &location.geometry {
        Some(Geometry::Point(point)) => {
            object.insert("geoLocationPoint".to_string(), point_to_json(point));
        },
        Some(Geometry::BoundingBox(bounding_box)) => {
            object.insert(
                "geoLocationBox".to_string(),
                json!({
                    "westBoundLongitude": bounding_box.west_longitude,
                    "eastBoundLongitude": bounding_box.east_longitude,
                    "southBoundLatitude": bounding_box.south_latitude,
                    "northBoundLatitude": bounding_box.north_latitude
                }),
            );
        },
        Some(Geometry::Polygon(polygon)) => {
            object.insert(
                "geoLocationPolygon".to_string(),
                Value::Array(
                    polygon
                        .vertices
                        .iter()
                        .map(|vertex| json!({ "polygonPoint": point_to_json(vertex) }))
                        .collect(),
                ),
            );
            if let Some(interior) = &polygon.interior_point {
                object.insert("inPolygonPoint".to_string(), point_to_json(interior));
            }
        },
        None => {},
    }

    Value::Object(object)
}

fn point_to_json(point: &GeoPoint) -> Value {
    json!({
        "pointLatitude": point.latitude,
        "pointLongitude": point.longitude
    })
}

fn size_to_json(size: &Size) -> Value {
    json!(size.render())
}

fn funding_to_json(funding: &FundingReference) -> Value {
    let mut object = Map::new();
    object.insert("funderName".to_string(), json!(funding.funder_name));
    if let Some(number) = &funding.award_number {
        object.insert("awardNumber".to_string(), json!(number));
    }
    if let Some(title) = &funding.award_title {
        object.insert("awardTitle".to_string(), json!(title));
    }
    Value::Object(object)
}

/// Convert a DataCite JSON document back into a resource graph.
///
/// Accepts either the `{data: {attributes}}` envelope or a bare attributes
/// object. Creator and contributor appearances are deduplicated through the
/// identity resolver — a person recurring under different role labels
/// merges with a merged role list, and institution names deduplicate after
/// whitespace normalization independent of case.
///
/// # Errors
///
/// Returns [`MetaError::MalformedInput`] when the document is not an
/// object.
pub fn datacite_json_to_resource(document: &Value) -> Result<Resource> {
    let attributes = document
        .pointer("/data/attributes")
        .unwrap_or(document)
        .as_object()
        .ok_or_else(|| {
            MetaError::MalformedInput("expected a DataCite attributes object".to_string())
        })?;

    let (identifier, kind) = read_identifier(attributes);
    let mut resource = Resource::new(kind);
    resource.identifier = identifier;

    if let Some(titles) = attributes.get("titles").and_then(Value::as_array) {
        for title in titles {
            let Some(value) = title.get("title").and_then(Value::as_str) else {
                continue;
            };
            resource.titles.push(Title {
                value: value.to_string(),
                title_type: TitleType::from_label(
                    title.get("titleType").and_then(Value::as_str),
                ),
            });
        }
    }

    resource.publisher = attributes
        .get("publisher")
        .and_then(Value::as_str)
        .map(str::to_string);
    resource.publication_year = attributes
        .get("publicationYear")
        .and_then(Value::as_i64)
        .and_then(|year| i32::try_from(year).ok());
    resource.version = attributes
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string);

    if let Some(label) = attributes
        .get("types")
        .and_then(|types| types.get("resourceType"))
        .and_then(Value::as_str)
    {
        resource.apply_resource_type_label(label);
    }

    if let Some(entries) = attributes.get("dates").and_then(Value::as_array) {
        for entry in entries {
            let Some(value) = entry.get("date").and_then(Value::as_str) else {
                continue;
            };
            let date_type = entry
                .get("dateType")
                .and_then(Value::as_str)
                .map_or(DateType::Other, DateType::from_label);
            let (start, end) = dates::split_range(value);
            resource.dates.push(ResourceDate::new(date_type, start, end));
        }
    }

    if let Some(entries) = attributes.get("descriptions").and_then(Value::as_array) {
        resource.description = entries
            .iter()
            .find_map(|entry| entry.get("description").and_then(Value::as_str))
            .map(str::to_string);
    }

    if let Some(entries) = attributes.get("geoLocations").and_then(Value::as_array) {
        for entry in entries {
            let location = read_location(entry);
            if !location.is_empty() {
                resource.geo_locations.push(location);
            }
        }
    }

    if let Some(entries) = attributes.get("sizes").and_then(Value::as_array) {
        for entry in entries {
            if let Some(size) = entry.as_str().and_then(Size::parse_rendered) {
                resource.sizes.push(size);
            }
        }
    }

    if let Some(entries) = attributes.get("subjects").and_then(Value::as_array) {
        for entry in entries {
            let Some(value) = entry.get("subject").and_then(Value::as_str) else {
                continue;
            };
            let Some(scheme) = entry
                .get("subjectScheme")
                .and_then(Value::as_str)
                .and_then(SubjectScheme::from_label)
            else {
                continue;
            };
            resource.subjects.push(SubjectTag {
                value: value.to_string(),
                scheme,
            });
        }
    }

    if let Some(entries) = attributes.get("fundingReferences").and_then(Value::as_array) {
        for entry in entries {
            let Some(funder_name) = entry.get("funderName").and_then(Value::as_str) else {
                continue;
            };
            resource.funding_references.push(FundingReference {
                funder_name: funder_name.to_string(),
                award_number: entry
                    .get("awardNumber")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                award_title: entry
                    .get("awardTitle")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            });
        }
    }

    if let Some(entries) = attributes.get("relatedIdentifiers").and_then(Value::as_array) {
        resource.parent_identifier = entries
            .iter()
            .find(|entry| {
                entry.get("relationType").and_then(Value::as_str) == Some("IsPartOf")
            })
            .and_then(|entry| entry.get("relatedIdentifier").and_then(Value::as_str))
            .map(str::to_string);
    }

    let mut candidates = Vec::new();
    if let Some(creators) = attributes.get("creators").and_then(Value::as_array) {
        for creator in creators {
            if let Some(agent) = read_agent(creator) {
                candidates.push(AgentCandidate::new(agent, Role::Creator));
            }
        }
    }
    if let Some(contributors) = attributes.get("contributors").and_then(Value::as_array) {
        for contributor in contributors {
            let role = contributor
                .get("contributorType")
                .and_then(Value::as_str)
                .map_or(Role::Other, Role::from_label);
            if let Some(agent) = read_agent(contributor) {
                candidates.push(AgentCandidate::new(agent, role));
            }
        }
    }
    let resolved = resolve_identities(candidates);
    resource.authors = resolved.authors;
    resource.contributors = resolved.contributors;

    Ok(resource)
}

/// Read the primary identifier and classify the resource kind.
fn read_identifier(attributes: &Map<String, Value>) -> (Option<String>, ResourceKind) {
    if let Some(entry) = attributes
        .get("identifiers")
        .and_then(Value::as_array)
        .and_then(|entries| entries.first())
    {
        let identifier = entry
            .get("identifier")
            .and_then(Value::as_str)
            .map(str::to_string);
        let kind = match entry.get("identifierType").and_then(Value::as_str) {
            Some("IGSN") | None => ResourceKind::PhysicalSample,
            Some(_) => ResourceKind::Dataset,
        };
        return (identifier, kind);
    }

    if let Some(doi) = attributes.get("doi").and_then(Value::as_str) {
        return (Some(doi.to_string()), ResourceKind::Dataset);
    }

    (None, ResourceKind::PhysicalSample)
}

/// Read a creator/contributor object into an agent.
fn read_agent(entry: &Value) -> Option<Agent> {
    let name = entry.get("name").and_then(Value::as_str).map(str::trim);
    let name_type = entry.get("nameType").and_then(Value::as_str);

    if name_type == Some("Organizational") {
        let mut institution = Institution::new(name?.to_string());
        institution.ror = read_name_identifier(entry, "ROR");
        return Some(Agent::Institution(institution));
    }

    let explicit_given = entry
        .get("givenName")
        .and_then(Value::as_str)
        .map(str::to_string);
    let explicit_family = entry
        .get("familyName")
        .and_then(Value::as_str)
        .map(str::to_string);

    let (given, family) = if explicit_given.is_some() || explicit_family.is_some() {
        (explicit_given, explicit_family)
    } else {
        match name?.split_once(',') {
            Some((family, given)) => (
                Some(given.trim().to_string()).filter(|s| !s.is_empty()),
                Some(family.trim().to_string()).filter(|s| !s.is_empty()),
            ),
            None => (None, Some(name?.to_string()).filter(|s| !s.is_empty())),
        }
    };

    if given.is_none() && family.is_none() {
        return None;
    }

    let mut person = Person::new(given, family);
    person.orcid = read_name_identifier(entry, "ORCID");
    if let Some(affiliations) = entry.get("affiliation").and_then(Value::as_array) {
        person.affiliations = affiliations
            .iter()
            .filter_map(|a| a.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect();
    }
    Some(Agent::Person(person))
}

fn read_name_identifier(entry: &Value, scheme: &str) -> Option<String> {
    entry
        .get("nameIdentifiers")
        .and_then(Value::as_array)?
        .iter()
        .find(|id| id.get("nameIdentifierScheme").and_then(Value::as_str) == Some(scheme))
        .and_then(|id| id.get("nameIdentifier").and_then(Value::as_str))
        .map(str::to_string)
}

/// Read one geoLocation entry, mirroring whichever variant is present.
fn read_location(entry: &Value) -> GeoLocation {
    let place = entry
        .get("geoLocationPlace")
        .and_then(Value::as_str)
        .map(str::to_string);

    let geometry = if let Some(polygon) = entry.get("geoLocationPolygon").and_then(Value::as_array)
    {
        Some(Geometry::Polygon(GeoPolygon {
            vertices: polygon
                .iter()
                .filter_map(|vertex| read_point(vertex.get("polygonPoint")?))
                .collect(),
            interior_point: entry.get("inPolygonPoint").and_then(read_point),
        }))
    } else if let Some(bounding_box) = entry.get("geoLocationBox") {
        read_box(bounding_box).map(Geometry::BoundingBox)
    } else {
        entry
            .get("geoLocationPoint")
            .and_then(read_point)
            .map(Geometry::Point)
    };

    GeoLocation { place, geometry }
}

fn read_point(value: &Value) -> Option<GeoPoint> {
    Some(GeoPoint {
        latitude: value.get("pointLatitude")?.as_f64()?,
        longitude: value.get("pointLongitude")?.as_f64()?,
    })
}

fn read_box(value: &Value) -> Option<GeoBox> {
    Some(GeoBox {
        west_longitude: value.get("westBoundLongitude")?.as_f64()?,
        east_longitude: value.get("eastBoundLongitude")?.as_f64()?,
        south_latitude: value.get("southBoundLatitude")?.as_f64()?,
        north_latitude: value.get("northBoundLatitude")?.as_f64()?,
    })
}
