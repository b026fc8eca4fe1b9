//! Contributor and creator role enumeration.
//!
//! Role names arrive as free-text labels from upstream systems
//! (`"pointOfContact"`, `"ProjectLeader"`, legacy database strings). They
//! are represented as a closed enumeration matching the DataCite
//! contributorType vocabulary, with an explicit [`Role::Other`] fallback for
//! unrecognized labels, so that matching stays exhaustive.

use serde::{Deserialize, Serialize};

/// A creator or contributor role.
///
/// Covers authorship ([`Role::Creator`]) plus the DataCite contributorType
/// vocabulary. Unrecognized input labels map to [`Role::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Authorship role (DataCite creator; `collector` in sample uploads)
    Creator,
    /// Point of contact for the resource
    ContactPerson,
    /// Person/institution responsible for finding or gathering data
    DataCollector,
    /// Person tasked with reviewing/enhancing/standardizing metadata
    DataCurator,
    /// Person responsible for maintaining the data and its storage
    DataManager,
    /// Institution/person distributing the resource
    Distributor,
    /// Editor of the resource
    Editor,
    /// Organization hosting the data
    HostingInstitution,
    /// Person responsible for the artifact's production
    Producer,
    /// Person officially designated as head of the project
    ProjectLeader,
    /// Person officially designated as manager of the project
    ProjectManager,
    /// Person on the project membership level
    ProjectMember,
    /// Person with no specifically defined role but related to the resource
    RelatedPerson,
    /// Person involved in analyzing data or the results of an experiment
    Researcher,
    /// Group of individuals with a lab, department, or division focus
    ResearchGroup,
    /// Person or institution owning or managing property rights
    RightsHolder,
    /// Person or organization that issued a contract or provided funding
    Sponsor,
    /// Designated administrator over one or more groups/teams
    Supervisor,
    /// Leader of a defined work package within the project
    WorkPackageLeader,
    /// Any other role; fallback for unrecognized labels
    Other,
}

impl Role {
    /// Parse a free-text role label.
    ///
    /// Matching is case-insensitive and tolerant of surrounding whitespace.
    /// Common aliases from upstream systems are folded in: `pointOfContact`
    /// and `contact` map to [`Role::ContactPerson`]; `author` and
    /// `collector` map to [`Role::Creator`]. Anything unrecognized becomes
    /// [`Role::Other`].
    ///
    /// # Examples
    ///
    /// ```
    /// use metanorm::Role;
    ///
    /// assert_eq!(Role::from_label("pointOfContact"), Role::ContactPerson);
    /// assert_eq!(Role::from_label(" Collector "), Role::Creator);
    /// assert_eq!(Role::from_label("InventedRole"), Role::Other);
    /// ```
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "creator" | "author" | "collector" => Role::Creator,
            "contactperson" | "pointofcontact" | "contact" => Role::ContactPerson,
            "datacollector" => Role::DataCollector,
            "datacurator" => Role::DataCurator,
            "datamanager" => Role::DataManager,
            "distributor" => Role::Distributor,
            "editor" => Role::Editor,
            "hostinginstitution" => Role::HostingInstitution,
            "producer" => Role::Producer,
            "projectleader" => Role::ProjectLeader,
            "projectmanager" => Role::ProjectManager,
            "projectmember" => Role::ProjectMember,
            "relatedperson" => Role::RelatedPerson,
            "researcher" => Role::Researcher,
            "researchgroup" => Role::ResearchGroup,
            "rightsholder" => Role::RightsHolder,
            "sponsor" => Role::Sponsor,
            "supervisor" => Role::Supervisor,
            "workpackageleader" => Role::WorkPackageLeader,
            "other" => Role::Other,
            unrecognized => {
                tracing::warn!(label = unrecognized, "unrecognized role label, using Other");
                Role::Other
            },
        }
    }

    /// The DataCite label for this role.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Role::Creator => "Creator",
            Role::ContactPerson => "ContactPerson",
            Role::DataCollector => "DataCollector",
            Role::DataCurator => "DataCurator",
            Role::DataManager => "DataManager",
            Role::Distributor => "Distributor",
            Role::Editor => "Editor",
            Role::HostingInstitution => "HostingInstitution",
            Role::Producer => "Producer",
            Role::ProjectLeader => "ProjectLeader",
            Role::ProjectManager => "ProjectManager",
            Role::ProjectMember => "ProjectMember",
            Role::RelatedPerson => "RelatedPerson",
            Role::Researcher => "Researcher",
            Role::ResearchGroup => "ResearchGroup",
            Role::RightsHolder => "RightsHolder",
            Role::Sponsor => "Sponsor",
            Role::Supervisor => "Supervisor",
            Role::WorkPackageLeader => "WorkPackageLeader",
            Role::Other => "Other",
        }
    }

    /// Whether this role marks the agent as point of contact.
    #[must_use]
    pub fn is_contact(&self) -> bool {
        matches!(self, Role::ContactPerson)
    }

    /// Whether this role denotes authorship.
    #[must_use]
    pub fn is_authorship(&self) -> bool {
        matches!(self, Role::Creator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_aliases() {
        assert_eq!(Role::from_label("pointOfContact"), Role::ContactPerson);
        assert_eq!(Role::from_label("ContactPerson"), Role::ContactPerson);
        assert_eq!(Role::from_label("contact"), Role::ContactPerson);
        assert!(Role::from_label("pointOfContact").is_contact());
    }

    #[test]
    fn test_authorship_aliases() {
        assert_eq!(Role::from_label("Creator"), Role::Creator);
        assert_eq!(Role::from_label("collector"), Role::Creator);
        assert_eq!(Role::from_label("author"), Role::Creator);
        assert!(Role::from_label("collector").is_authorship());
    }

    #[test]
    fn test_label_roundtrip() {
        let roles = [
            Role::Creator,
            Role::ContactPerson,
            Role::DataCurator,
            Role::ProjectLeader,
            Role::WorkPackageLeader,
            Role::Other,
        ];
        for role in roles {
            assert_eq!(Role::from_label(role.label()), role);
        }
    }

    #[test]
    fn test_unrecognized_falls_back_to_other() {
        assert_eq!(Role::from_label("ChiefVibesOfficer"), Role::Other);
        assert_eq!(Role::from_label(""), Role::Other);
        assert!(!Role::from_label("whatever").is_contact());
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(Role::from_label("POINTOFCONTACT"), Role::ContactPerson);
        assert_eq!(Role::from_label("datacurator"), Role::DataCurator);
    }
}
