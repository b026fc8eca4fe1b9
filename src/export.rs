//! Shared export configuration and helpers.
//!
//! Export behavior that varies per deployment is passed in explicitly
//! through [`ExportOptions`]; there are no module-level defaults. The
//! timezone fallback in particular is deployment documentation made code:
//! stored datetimes without a UTC offset get it applied at render time.

use chrono::FixedOffset;

use crate::resource::Resource;

/// Deployment-specific export configuration.
///
/// Constructed explicitly; there is deliberately no `Default`
/// implementation, so callers must state their timezone fallback.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// UTC offset applied to stored datetimes that lack one
    pub timezone_fallback: FixedOffset,
    /// Publisher used when the resource carries none
    pub publisher_fallback: Option<String>,
}

impl ExportOptions {
    /// Create options with the given timezone fallback.
    #[must_use]
    pub fn new(timezone_fallback: FixedOffset) -> Self {
        ExportOptions {
            timezone_fallback,
            publisher_fallback: None,
        }
    }

    /// Set the publisher fallback.
    #[must_use]
    pub fn with_publisher_fallback(mut self, publisher: impl Into<String>) -> Self {
        self.publisher_fallback = Some(publisher.into());
        self
    }
}

/// Derive the download filename for an exported document.
///
/// The identifier is preferred, sanitized for filesystem use; without one
/// the internal resource id keys a stable fallback.
///
/// # Examples
///
/// ```
/// use metanorm::export::export_filename;
/// use metanorm::{Resource, ResourceKind};
///
/// let mut resource = Resource::new(ResourceKind::PhysicalSample);
/// resource.identifier = Some("10.5880/GFZ.1.2024.001".to_string());
/// assert_eq!(export_filename(&resource, "json"), "10.5880-GFZ.1.2024.001.json");
///
/// resource.identifier = None;
/// resource.id = Some(42);
/// assert_eq!(export_filename(&resource, "xml"), "resource-42.xml");
/// ```
#[must_use]
pub fn export_filename(resource: &Resource, extension: &str) -> String {
    let stem = match (&resource.identifier, resource.id) {
        (Some(identifier), _) => sanitize(identifier),
        (None, Some(id)) => format!("resource-{id}"),
        (None, None) => "resource-export".to_string(),
    };
    format!("{stem}.{extension}")
}

/// Replace characters unsafe in filenames.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}
