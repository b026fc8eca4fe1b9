//! DataCite XML ingestion.
//!
//! Parses a DataCite metadata XML document (kernel-4 family) into the
//! internal resource graph, routing creators and contributors through the
//! identity resolver and date strings through the granular date resolver.
//!
//! # Examples
//!
//! ```ignore
//! use metanorm::xml_import::xml_to_resource;
//!
//! let resource = xml_to_resource(&xml_string)?;
//! println!("{:?}", resource.main_title());
//! # Ok::<(), metanorm::MetaError>(())
//! ```

use quick_xml::de::from_str as xml_from_str;
use serde::Deserialize;

use crate::dates;
use crate::error::{MetaError, Result};
use crate::identity::{resolve_identities, AgentCandidate};
use crate::resource::{
    Agent, DateType, FundingReference, GeoBox, GeoLocation, GeoPoint, GeoPolygon, Geometry,
    Institution, Person, Resource, ResourceDate, ResourceKind, Size, SubjectScheme, SubjectTag,
    Title, TitleType,
};
use crate::roles::Role;

/// DataCite resource element for deserialization.
#[derive(Debug, Deserialize)]
struct XmlResource {
    identifier: Option<XmlIdentifier>,
    creators: Option<XmlCreators>,
    contributors: Option<XmlContributors>,
    titles: Option<XmlTitles>,
    publisher: Option<String>,
    #[serde(rename = "publicationYear")]
    publication_year: Option<String>,
    subjects: Option<XmlSubjects>,
    dates: Option<XmlDates>,
    #[serde(rename = "resourceType")]
    resource_type: Option<XmlResourceType>,
    descriptions: Option<XmlDescriptions>,
    #[serde(rename = "geoLocations")]
    geo_locations: Option<XmlGeoLocations>,
    version: Option<String>,
    sizes: Option<XmlSizes>,
    #[serde(rename = "relatedIdentifiers")]
    related_identifiers: Option<XmlRelatedIdentifiers>,
    #[serde(rename = "fundingReferences")]
    funding_references: Option<XmlFundingReferences>,
}

#[derive(Debug, Deserialize)]
struct XmlIdentifier {
    #[serde(rename = "@identifierType")]
    identifier_type: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlCreators {
    #[serde(default)]
    creator: Vec<XmlAgent>,
}

#[derive(Debug, Deserialize)]
struct XmlContributors {
    #[serde(default)]
    contributor: Vec<XmlAgent>,
}

/// Shared shape of creator and contributor elements.
#[derive(Debug, Deserialize)]
struct XmlAgent {
    #[serde(rename = "@contributorType")]
    contributor_type: Option<String>,
    #[serde(rename = "creatorName")]
    creator_name: Option<XmlName>,
    #[serde(rename = "contributorName")]
    contributor_name: Option<XmlName>,
    #[serde(rename = "givenName")]
    given_name: Option<String>,
    #[serde(rename = "familyName")]
    family_name: Option<String>,
    #[serde(rename = "nameIdentifier", default)]
    name_identifiers: Vec<XmlNameIdentifier>,
    #[serde(default)]
    affiliation: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct XmlName {
    #[serde(rename = "@nameType")]
    name_type: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlNameIdentifier {
    #[serde(rename = "@nameIdentifierScheme")]
    scheme: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlTitles {
    #[serde(default)]
    title: Vec<XmlTitle>,
}

#[derive(Debug, Deserialize)]
struct XmlTitle {
    #[serde(rename = "@titleType")]
    title_type: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlSubjects {
    #[serde(default)]
    subject: Vec<XmlSubject>,
}

#[derive(Debug, Deserialize)]
struct XmlSubject {
    #[serde(rename = "@subjectScheme")]
    scheme: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlDates {
    #[serde(default)]
    date: Vec<XmlDate>,
}

#[derive(Debug, Deserialize)]
struct XmlDate {
    #[serde(rename = "@dateType")]
    date_type: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlResourceType {
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlDescriptions {
    #[serde(default)]
    description: Vec<XmlDescription>,
}

#[derive(Debug, Deserialize)]
struct XmlDescription {
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlGeoLocations {
    #[serde(rename = "geoLocation", default)]
    geo_location: Vec<XmlGeoLocation>,
}

#[derive(Debug, Deserialize)]
struct XmlGeoLocation {
    #[serde(rename = "geoLocationPlace")]
    place: Option<String>,
    #[serde(rename = "geoLocationPoint")]
    point: Option<XmlGeoPoint>,
    #[serde(rename = "geoLocationBox")]
    bounding_box: Option<XmlGeoBox>,
    #[serde(rename = "geoLocationPolygon")]
    polygon: Option<XmlGeoPolygon>,
}

#[derive(Debug, Deserialize)]
struct XmlGeoPoint {
    #[serde(rename = "pointLatitude")]
    latitude: f64,
    #[serde(rename = "pointLongitude")]
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct XmlGeoBox {
    #[serde(rename = "westBoundLongitude")]
    west: f64,
    #[serde(rename = "eastBoundLongitude")]
    east: f64,
    #[serde(rename = "southBoundLatitude")]
    south: f64,
    #[serde(rename = "northBoundLatitude")]
    north: f64,
}

#[derive(Debug, Deserialize)]
struct XmlGeoPolygon {
    #[serde(rename = "polygonPoint", default)]
    polygon_point: Vec<XmlGeoPoint>,
    #[serde(rename = "inPolygonPoint")]
    in_polygon_point: Option<XmlGeoPoint>,
}

#[derive(Debug, Deserialize)]
struct XmlSizes {
    #[serde(default)]
    size: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct XmlRelatedIdentifiers {
    #[serde(rename = "relatedIdentifier", default)]
    related_identifier: Vec<XmlRelatedIdentifier>,
}

#[derive(Debug, Deserialize)]
struct XmlRelatedIdentifier {
    #[serde(rename = "@relationType")]
    relation_type: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlFundingReferences {
    #[serde(rename = "fundingReference", default)]
    funding_reference: Vec<XmlFundingReference>,
}

#[derive(Debug, Deserialize)]
struct XmlFundingReference {
    #[serde(rename = "funderName")]
    funder_name: Option<String>,
    #[serde(rename = "awardNumber")]
    award_number: Option<String>,
    #[serde(rename = "awardTitle")]
    award_title: Option<String>,
}

/// Parse a DataCite XML document into a resource graph.
///
/// An `identifierType` of `IGSN` (or an absent identifier) classifies the
/// resource as a physical sample; anything else is a dataset. Creator and
/// contributor appearances are deduplicated through the identity resolver.
///
/// # Errors
///
/// Returns [`MetaError::MalformedInput`] when the XML structure cannot be
/// parsed.
pub fn xml_to_resource(xml: &str) -> Result<Resource> {
    let parsed: XmlResource = xml_from_str(xml)
        .map_err(|error| MetaError::MalformedInput(format!("invalid DataCite XML: {error}")))?;

    let kind = match &parsed.identifier {
        Some(identifier) => match identifier.identifier_type.as_deref() {
            None | Some("IGSN") => ResourceKind::PhysicalSample,
            Some(_) => ResourceKind::Dataset,
        },
        None => ResourceKind::PhysicalSample,
    };

    let mut resource = Resource::new(kind);
    resource.identifier = parsed
        .identifier
        .and_then(|i| i.value)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    resource.publisher = non_empty(parsed.publisher);
    resource.version = non_empty(parsed.version);
    resource.publication_year = parsed
        .publication_year
        .and_then(|raw| raw.trim().parse().ok());

    if let Some(titles) = parsed.titles {
        for title in titles.title {
            let Some(value) = non_empty(title.value) else {
                continue;
            };
            resource.titles.push(Title {
                value,
                title_type: TitleType::from_label(title.title_type.as_deref()),
            });
        }
    }

    if let Some(resource_type) = parsed.resource_type.and_then(|t| t.value) {
        resource.apply_resource_type_label(&resource_type);
    }

    if let Some(subjects) = parsed.subjects {
        for subject in subjects.subject {
            let Some(value) = non_empty(subject.value) else {
                continue;
            };
            let Some(scheme) = subject
                .scheme
                .as_deref()
                .and_then(SubjectScheme::from_label)
            else {
                tracing::warn!(subject = value, "subject with unknown scheme skipped");
                continue;
            };
            resource.subjects.push(SubjectTag { value, scheme });
        }
    }

    if let Some(dates) = parsed.dates {
        for date in dates.date {
            let Some(value) = non_empty(date.value) else {
                continue;
            };
            let date_type = date
                .date_type
                .as_deref()
                .map_or(DateType::Other, DateType::from_label);
            let (start, end) = dates::split_range(&value);
            resource.dates.push(ResourceDate::new(date_type, start, end));
        }
    }

    if let Some(descriptions) = parsed.descriptions {
        resource.description = descriptions
            .description
            .into_iter()
            .find_map(|d| non_empty(d.value));
    }

    if let Some(locations) = parsed.geo_locations {
        for location in locations.geo_location {
            let converted = convert_location(location);
            if !converted.is_empty() {
                resource.geo_locations.push(converted);
            }
        }
    }

    if let Some(sizes) = parsed.sizes {
        for raw in sizes.size {
            if let Some(size) = Size::parse_rendered(&raw) {
                resource.sizes.push(size);
            }
        }
    }

    if let Some(related) = parsed.related_identifiers {
        resource.parent_identifier = related
            .related_identifier
            .into_iter()
            .find(|entry| entry.relation_type.as_deref() == Some("IsPartOf"))
            .and_then(|entry| non_empty(entry.value));
    }

    if let Some(funding) = parsed.funding_references {
        for reference in funding.funding_reference {
            let Some(funder_name) = non_empty(reference.funder_name) else {
                continue;
            };
            resource.funding_references.push(FundingReference {
                funder_name,
                award_number: non_empty(reference.award_number),
                award_title: non_empty(reference.award_title),
            });
        }
    }

    let mut candidates = Vec::new();
    if let Some(creators) = parsed.creators {
        for creator in creators.creator {
            if let Some(agent) = convert_agent(&creator) {
                candidates.push(AgentCandidate::new(agent, Role::Creator));
            }
        }
    }
    if let Some(contributors) = parsed.contributors {
        for contributor in contributors.contributor {
            let role = contributor
                .contributor_type
                .as_deref()
                .map_or(Role::Other, Role::from_label);
            if let Some(agent) = convert_agent(&contributor) {
                candidates.push(AgentCandidate::new(agent, role));
            }
        }
    }
    let resolved = resolve_identities(candidates);
    resource.authors = resolved.authors;
    resource.contributors = resolved.contributors;

    Ok(resource)
}

fn convert_location(location: XmlGeoLocation) -> GeoLocation {
    let geometry = if let Some(polygon) = location.polygon {
        Some(Geometry::Polygon(GeoPolygon {
            vertices: polygon
                .polygon_point
                .into_iter()
                .map(|p| GeoPoint {
                    latitude: p.latitude,
                    longitude: p.longitude,
                })
                .collect(),
            interior_point: polygon.in_polygon_point.map(|p| GeoPoint {
                latitude: p.latitude,
                longitude: p.longitude,
            }),
        }))
    } else if let Some(bounding_box) = location.bounding_box {
        Some(Geometry::BoundingBox(GeoBox {
            west_longitude: bounding_box.west,
            east_longitude: bounding_box.east,
            south_latitude: bounding_box.south,
            north_latitude: bounding_box.north,
        }))
    } else {
        location.point.map(|point| {
            Geometry::Point(GeoPoint {
                latitude: point.latitude,
                longitude: point.longitude,
            })
        })
    };

    GeoLocation {
        place: non_empty(location.place),
        geometry,
    }
}

/// Convert a creator/contributor element into an agent, honoring the
/// explicit given/family name precedence over the combined name string.
fn convert_agent(xml: &XmlAgent) -> Option<Agent> {
    let name = xml
        .creator_name
        .as_ref()
        .or(xml.contributor_name.as_ref());
    let name_type = name.and_then(|n| n.name_type.as_deref());
    let display = name.and_then(|n| n.value.as_deref()).map(str::trim);

    if name_type == Some("Organizational") {
        let institution_name = display?.to_string();
        let mut institution = Institution::new(institution_name);
        institution.ror = identifier_with_scheme(xml, "ROR");
        return Some(Agent::Institution(institution));
    }

    let explicit_given = non_empty(xml.given_name.clone());
    let explicit_family = non_empty(xml.family_name.clone());

    let (given, family) = if explicit_given.is_some() || explicit_family.is_some() {
        (explicit_given, explicit_family)
    } else {
        match display {
            Some(display) => match display.split_once(',') {
                Some((family, given)) => (
                    non_blank(given),
                    non_blank(family),
                ),
                None => (None, non_blank(display)),
            },
            None => (None, None),
        }
    };

    if given.is_none() && family.is_none() {
        return None;
    }

    let mut person = Person::new(given, family);
    person.orcid = identifier_with_scheme(xml, "ORCID");
    person.affiliations = xml
        .affiliation
        .iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    Some(Agent::Person(person))
}

fn identifier_with_scheme(xml: &XmlAgent, scheme: &str) -> Option<String> {
    xml.name_identifiers
        .iter()
        .find(|id| id.scheme.as_deref() == Some(scheme))
        .and_then(|id| id.value.as_deref())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<resource xmlns="http://datacite.org/schema/kernel-4">
  <identifier identifierType="IGSN">IGSN0001</identifier>
  <creators>
    <creator>
      <creatorName nameType="Personal">Förste, Christoph</creatorName>
      <givenName>Christoph</givenName>
      <familyName>Förste</familyName>
      <nameIdentifier nameIdentifierScheme="ORCID">0000-0002-1825-0097</nameIdentifier>
      <affiliation>GFZ Potsdam</affiliation>
    </creator>
  </creators>
  <contributors>
    <contributor contributorType="ContactPerson">
      <contributorName>Foerste, Christoph</contributorName>
    </contributor>
    <contributor contributorType="DataCurator">
      <contributorName nameType="Organizational">GFZ Data Services</contributorName>
    </contributor>
  </contributors>
  <titles>
    <title>Basalt core, site 12</title>
    <title titleType="Other">Field-7</title>
  </titles>
  <publisher>GFZ Data Services</publisher>
  <publicationYear>2024</publicationYear>
  <resourceType resourceTypeGeneral="PhysicalObject">Core: Basalt</resourceType>
  <dates>
    <date dateType="Collected">2020-01-01/2020-02-29</date>
    <date dateType="Issued">2024-01-15</date>
  </dates>
  <geoLocations>
    <geoLocation>
      <geoLocationPlace>Potsdam</geoLocationPlace>
      <geoLocationPoint>
        <pointLatitude>52.38</pointLatitude>
        <pointLongitude>13.06</pointLongitude>
      </geoLocationPoint>
    </geoLocation>
  </geoLocations>
</resource>"#;

    #[test]
    fn test_parse_sample_document() {
        let resource = xml_to_resource(SAMPLE_XML).unwrap();

        assert_eq!(resource.identifier.as_deref(), Some("IGSN0001"));
        assert_eq!(resource.kind, ResourceKind::PhysicalSample);
        assert_eq!(resource.main_title(), Some("Basalt core, site 12"));
        assert_eq!(resource.sample_type.as_deref(), Some("Core"));
        assert_eq!(resource.material.as_deref(), Some("Basalt"));
        assert_eq!(resource.publication_year, Some(2024));
    }

    #[test]
    fn test_contact_contributor_collapses_into_creator() {
        let resource = xml_to_resource(SAMPLE_XML).unwrap();

        // Förste appears as creator and, in digraph spelling, as contact
        assert_eq!(resource.authors.len(), 1);
        assert!(resource.authors[0].is_contact);
        let Agent::Person(person) = &resource.authors[0].agent else {
            panic!("expected a person");
        };
        assert_eq!(person.orcid.as_deref(), Some("0000-0002-1825-0097"));

        // Only the institution remains a contributor
        assert_eq!(resource.contributors.len(), 1);
        assert!(matches!(
            resource.contributors[0].agent,
            Agent::Institution(_)
        ));
    }

    #[test]
    fn test_date_range_split() {
        let resource = xml_to_resource(SAMPLE_XML).unwrap();

        assert_eq!(resource.dates.len(), 2);
        assert_eq!(resource.dates[0].date_type, DateType::Collected);
        assert_eq!(resource.dates[0].start.as_deref(), Some("2020-01-01"));
        assert_eq!(resource.dates[0].end.as_deref(), Some("2020-02-29"));
        assert_eq!(resource.dates[1].start.as_deref(), Some("2024-01-15"));
        assert_eq!(resource.dates[1].end, None);
    }

    #[test]
    fn test_point_location() {
        let resource = xml_to_resource(SAMPLE_XML).unwrap();

        assert_eq!(resource.geo_locations.len(), 1);
        let location = &resource.geo_locations[0];
        assert_eq!(location.place.as_deref(), Some("Potsdam"));
        assert!(matches!(location.geometry, Some(Geometry::Point(_))));
    }

    #[test]
    fn test_polygon_location() {
        let xml = r#"<resource>
  <titles><title>T</title></titles>
  <geoLocations>
    <geoLocation>
      <geoLocationPolygon>
        <polygonPoint><pointLatitude>1</pointLatitude><pointLongitude>1</pointLongitude></polygonPoint>
        <polygonPoint><pointLatitude>2</pointLatitude><pointLongitude>1</pointLongitude></polygonPoint>
        <polygonPoint><pointLatitude>2</pointLatitude><pointLongitude>2</pointLongitude></polygonPoint>
        <polygonPoint><pointLatitude>1</pointLatitude><pointLongitude>1</pointLongitude></polygonPoint>
        <inPolygonPoint><pointLatitude>1.5</pointLatitude><pointLongitude>1.3</pointLongitude></inPolygonPoint>
      </geoLocationPolygon>
    </geoLocation>
  </geoLocations>
</resource>"#;
        let resource = xml_to_resource(xml).unwrap();

        let Some(Geometry::Polygon(polygon)) = &resource.geo_locations[0].geometry else {
            panic!("expected a polygon");
        };
        assert_eq!(polygon.vertices.len(), 4);
        assert!(polygon.interior_point.is_some());
    }

    #[test]
    fn test_malformed_xml_rejected() {
        let error = xml_to_resource("<resource><unclosed>").unwrap_err();
        assert!(matches!(error, MetaError::MalformedInput(_)));
    }

    #[test]
    fn test_doi_identifier_classifies_dataset() {
        let xml = r#"<resource>
  <identifier identifierType="DOI">10.5880/GFZ.1.2024.001</identifier>
  <titles><title>T</title></titles>
</resource>"#;
        let resource = xml_to_resource(xml).unwrap();
        assert_eq!(resource.kind, ResourceKind::Dataset);
    }
}
