//! DataCite XML serialization of resource graphs.
//!
//! Emits the DataCite metadata kernel-4 XML representation of a resource,
//! mirroring the JSON serializer's field rules: creators/contributors with
//! name-part emission, one date entry per stored range, exactly one
//! geoLocation variant per stored location, and alternate identifiers only
//! for sample resources. Text content escapes per XML 1.0 rules.
//!
//! # Examples
//!
//! ```ignore
//! use metanorm::datacite_xml::resource_to_datacite_xml;
//!
//! let xml = resource_to_datacite_xml(&resource, &options)?;
//! assert!(xml.contains("<creators>"));
//! # Ok::<(), metanorm::MetaError>(())
//! ```

use std::fmt::Write;

use crate::dates;
use crate::error::Result;
use crate::export::ExportOptions;
use crate::resource::{
    Agent, AgentLink, GeoPoint, Geometry, Resource, ResourceKind,
};
use crate::roles::Role;

/// Convert a resource graph to DataCite XML.
///
/// # Errors
///
/// Infallible today; the `Result` return matches the JSON serializer so
/// callers treat both formats uniformly.
pub fn resource_to_datacite_xml(resource: &Resource, options: &ExportOptions) -> Result<String> {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<resource xmlns=\"http://datacite.org/schema/kernel-4\" ");
    xml.push_str("xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" ");
    xml.push_str("xsi:schemaLocation=\"http://datacite.org/schema/kernel-4 ");
    xml.push_str("http://schema.datacite.org/meta/kernel-4.5/metadata.xsd\">\n");

    write_identifier(&mut xml, resource);
    write_creators(&mut xml, resource);
    write_titles(&mut xml, resource);
    write_publisher(&mut xml, resource, options);
    write_publication_year(&mut xml, resource);
    write_resource_type(&mut xml, resource);
    write_subjects(&mut xml, resource);
    write_contributors(&mut xml, resource);
    write_dates(&mut xml, resource, options);
    write_alternate_identifiers(&mut xml, resource);
    write_related_identifiers(&mut xml, resource);
    write_sizes(&mut xml, resource);
    write_version(&mut xml, resource);
    write_descriptions(&mut xml, resource);
    write_geo_locations(&mut xml, resource);
    write_funding_references(&mut xml, resource);

    xml.push_str("</resource>\n");
    Ok(xml)
}

fn identifier_type(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::PhysicalSample => "IGSN",
        ResourceKind::Dataset => "DOI",
    }
}

fn write_identifier(xml: &mut String, resource: &Resource) {
    if let Some(identifier) = &resource.identifier {
        writeln!(
            xml,
            "  <identifier identifierType=\"{}\">{}</identifier>",
            identifier_type(resource.kind),
            escape_xml(identifier)
        )
        .ok();
    }
}

fn write_creators(xml: &mut String, resource: &Resource) {
    xml.push_str("  <creators>\n");
    for link in &resource.authors {
        xml.push_str("    <creator>\n");
        write_agent_parts(xml, link, "creatorName");
        xml.push_str("    </creator>\n");
    }
    xml.push_str("  </creators>\n");
}

fn write_contributors(xml: &mut String, resource: &Resource) {
    let contact_authors: Vec<&AgentLink> = resource
        .authors
        .iter()
        .filter(|link| link.is_contact)
        .collect();
    if resource.contributors.is_empty() && contact_authors.is_empty() {
        return;
    }

    xml.push_str("  <contributors>\n");
    for link in &resource.contributors {
        let role = link.roles.first().copied().unwrap_or(Role::Other);
        writeln!(
            xml,
            "    <contributor contributorType=\"{}\">",
            role.label()
        )
        .ok();
        write_agent_parts(xml, link, "contributorName");
        xml.push_str("    </contributor>\n");
    }
    // Contact status survives the round trip as a ContactPerson entry
    for link in contact_authors {
        xml.push_str("    <contributor contributorType=\"ContactPerson\">\n");
        write_agent_parts(xml, link, "contributorName");
        xml.push_str("    </contributor>\n");
    }
    xml.push_str("  </contributors>\n");
}

/// Shared name/identifier/affiliation emission for creators and
/// contributors.
fn write_agent_parts(xml: &mut String, link: &AgentLink, name_element: &str) {
    match &link.agent {
        Agent::Person(person) => {
            writeln!(
                xml,
                "      <{name_element} nameType=\"Personal\">{}</{name_element}>",
                escape_xml(&link.agent.display_name())
            )
            .ok();
            if let Some(given) = &person.given_name {
                writeln!(xml, "      <givenName>{}</givenName>", escape_xml(given)).ok();
            }
            if let Some(family) = &person.family_name {
                writeln!(xml, "      <familyName>{}</familyName>", escape_xml(family)).ok();
            }
            if let Some(orcid) = &person.orcid {
                writeln!(
                    xml,
                    "      <nameIdentifier nameIdentifierScheme=\"ORCID\" \
                     schemeURI=\"https://orcid.org\">{}</nameIdentifier>",
                    escape_xml(orcid)
                )
                .ok();
            }
            for affiliation in &person.affiliations {
                writeln!(
                    xml,
                    "      <affiliation>{}</affiliation>",
                    escape_xml(affiliation)
                )
                .ok();
            }
        },
        Agent::Institution(institution) => {
            writeln!(
                xml,
                "      <{name_element} nameType=\"Organizational\">{}</{name_element}>",
                escape_xml(&institution.name)
            )
            .ok();
            if let Some(ror) = &institution.ror {
                writeln!(
                    xml,
                    "      <nameIdentifier nameIdentifierScheme=\"ROR\" \
                     schemeURI=\"https://ror.org\">{}</nameIdentifier>",
                    escape_xml(ror)
                )
                .ok();
            }
        },
    }
}

fn write_titles(xml: &mut String, resource: &Resource) {
    xml.push_str("  <titles>\n");
    for title in &resource.titles {
        match title.title_type.label() {
            Some(label) => writeln!(
                xml,
                "    <title titleType=\"{label}\">{}</title>",
                escape_xml(&title.value)
            )
            .ok(),
            None => writeln!(xml, "    <title>{}</title>", escape_xml(&title.value)).ok(),
        };
    }
    xml.push_str("  </titles>\n");
}

fn write_publisher(xml: &mut String, resource: &Resource, options: &ExportOptions) {
    let publisher = resource
        .publisher
        .as_deref()
        .or(options.publisher_fallback.as_deref());
    if let Some(publisher) = publisher {
        writeln!(xml, "  <publisher>{}</publisher>", escape_xml(publisher)).ok();
    }
}

fn write_publication_year(xml: &mut String, resource: &Resource) {
    if let Some(year) = resource.publication_year {
        writeln!(xml, "  <publicationYear>{year}</publicationYear>").ok();
    }
}

fn write_resource_type(xml: &mut String, resource: &Resource) {
    let general = match resource.kind {
        ResourceKind::PhysicalSample => "PhysicalObject",
        ResourceKind::Dataset => "Dataset",
    };
    writeln!(
        xml,
        "  <resourceType resourceTypeGeneral=\"{general}\">{}</resourceType>",
        escape_xml(&resource.resource_type_label())
    )
    .ok();
}

fn write_subjects(xml: &mut String, resource: &Resource) {
    if resource.subjects.is_empty() {
        return;
    }
    xml.push_str("  <subjects>\n");
    for subject in &resource.subjects {
        writeln!(
            xml,
            "    <subject subjectScheme=\"{}\">{}</subject>",
            subject.scheme.label(),
            escape_xml(&subject.value)
        )
        .ok();
    }
    xml.push_str("  </subjects>\n");
}

fn write_dates(xml: &mut String, resource: &Resource, options: &ExportOptions) {
    let rendered: Vec<(&str, String)> = resource
        .dates
        .iter()
        .filter_map(|date| {
            let value = dates::render_range(
                date.start.as_deref(),
                date.end.as_deref(),
                options.timezone_fallback,
            )?;
            Some((date.date_type.label(), value))
        })
        .collect();
    if rendered.is_empty() {
        return;
    }

    xml.push_str("  <dates>\n");
    for (date_type, value) in rendered {
        writeln!(
            xml,
            "    <date dateType=\"{date_type}\">{}</date>",
            escape_xml(&value)
        )
        .ok();
    }
    xml.push_str("  </dates>\n");
}

fn write_alternate_identifiers(xml: &mut String, resource: &Resource) {
    let alternates = resource.alternate_identifiers();
    if alternates.is_empty() {
        return;
    }
    xml.push_str("  <alternateIdentifiers>\n");
    for alternate in alternates {
        writeln!(
            xml,
            "    <alternateIdentifier alternateIdentifierType=\"{}\">{}</alternateIdentifier>",
            escape_xml(&alternate.type_label),
            escape_xml(&alternate.value)
        )
        .ok();
    }
    xml.push_str("  </alternateIdentifiers>\n");
}

fn write_related_identifiers(xml: &mut String, resource: &Resource) {
    if let Some(parent) = &resource.parent_identifier {
        xml.push_str("  <relatedIdentifiers>\n");
        writeln!(
            xml,
            "    <relatedIdentifier relatedIdentifierType=\"IGSN\" \
             relationType=\"IsPartOf\">{}</relatedIdentifier>",
            escape_xml(parent)
        )
        .ok();
        xml.push_str("  </relatedIdentifiers>\n");
    }
}

fn write_sizes(xml: &mut String, resource: &Resource) {
    if resource.sizes.is_empty() {
        return;
    }
    xml.push_str("  <sizes>\n");
    for size in &resource.sizes {
        writeln!(xml, "    <size>{}</size>", escape_xml(&size.render())).ok();
    }
    xml.push_str("  </sizes>\n");
}

fn write_version(xml: &mut String, resource: &Resource) {
    if let Some(version) = &resource.version {
        writeln!(xml, "  <version>{}</version>", escape_xml(version)).ok();
    }
}

fn write_descriptions(xml: &mut String, resource: &Resource) {
    if let Some(description) = &resource.description {
        xml.push_str("  <descriptions>\n");
        writeln!(
            xml,
            "    <description descriptionType=\"Abstract\">{}</description>",
            escape_xml(description)
        )
        .ok();
        xml.push_str("  </descriptions>\n");
    }
}

fn write_geo_locations(xml: &mut String, resource: &Resource) {
    let locations: Vec<_> = resource
        .geo_locations
        .iter()
        .filter(|location| !location.is_empty())
        .collect();
    if locations.is_empty() {
        return;
    }

    xml.push_str("  <geoLocations>\n");
    for location in locations {
        xml.push_str("    <geoLocation>\n");
        if let Some(place) = &location.place {
            writeln!(
                xml,
                "      <geoLocationPlace>{}</geoLocationPlace>",
                escape_xml(place)
            )
            .ok();
        }
        match &location.geometry {
            Some(Geometry::Point(point)) => {
                xml.push_str("      <geoLocationPoint>\n");
                write_point(xml, point, 8);
                xml.push_str("      </geoLocationPoint>\n");
            },
            Some(Geometry::BoundingBox(bounding_box)) => {
                xml.push_str("      <geoLocationBox>\n");
                writeln!(
                    xml,
                    "        <westBoundLongitude>{}</westBoundLongitude>",
                    bounding_box.west_longitude
                )
                .ok();
                writeln!(
                    xml,
                    "        <eastBoundLongitude>{}</eastBoundLongitude>",
                    bounding_box.east_longitude
                )
                .ok();
                writeln!(
                    xml,
                    "        <southBoundLatitude>{}</southBoundLatitude>",
                    bounding_box.south_latitude
                )
                .ok();
                writeln!(
                    xml,
                    "        <northBoundLatitude>{}</northBoundLatitude>",
                    bounding_box.north_latitude
                )
                .ok();
                xml.push_str("      </geoLocationBox>\n");
            },
            Some(Geometry::Polygon(polygon)) => {
                xml.push_str("      <geoLocationPolygon>\n");
                for vertex in &polygon.vertices {
                    xml.push_str("        <polygonPoint>\n");
                    write_point(xml, vertex, 10);
                    xml.push_str("        </polygonPoint>\n");
                }
                if let Some(interior) = &polygon.interior_point {
                    xml.push_str("        <inPolygonPoint>\n");
                    write_point(xml, interior, 10);
                    xml.push_str("        </inPolygonPoint>\n");
                }
                xml.push_str("      </geoLocationPolygon>\n");
            },
            None => {},
        }
        xml.push_str("    </geoLocation>\n");
    }
    xml.push_str("  </geoLocations>\n");
}

fn write_point(xml: &mut String, point: &GeoPoint, indent: usize) {
    writeln!(
        xml,
        "{:indent$}<pointLatitude>{}</pointLatitude>",
        "",
        point.latitude
    )
    .ok();
    writeln!(
        xml,
        "{:indent$}<pointLongitude>{}</pointLongitude>",
        "",
        point.longitude
    )
    .ok();
}

fn write_funding_references(xml: &mut String, resource: &Resource) {
    if resource.funding_references.is_empty() {
        return;
    }
    xml.push_str("  <fundingReferences>\n");
    for funding in &resource.funding_references {
        xml.push_str("    <fundingReference>\n");
        writeln!(
            xml,
            "      <funderName>{}</funderName>",
            escape_xml(&funding.funder_name)
        )
        .ok();
        if let Some(number) = &funding.award_number {
            writeln!(xml, "      <awardNumber>{}</awardNumber>", escape_xml(number)).ok();
        }
        if let Some(title) = &funding.award_title {
            writeln!(xml, "      <awardTitle>{}</awardTitle>", escape_xml(title)).ok();
        }
        xml.push_str("    </fundingReference>\n");
    }
    xml.push_str("  </fundingReferences>\n");
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
