//! Identity resolution for creators and contributors.
//!
//! A person can appear several times for one resource: as collector in one
//! upload row, as `pointOfContact` in another, spelled `"Förste"` here and
//! `"Foerste"` there, with an ORCID in one appearance only. This module
//! collapses all appearances with the same normalized identity into a
//! single logical agent per resource, decides contact-person status, and
//! guards against identifier-driven mis-linking to unrelated stored agents.
//!
//! Resolution is a pure grouping function over an input list: no I/O, no
//! persistence, so it can be property-tested on its own. It never fails —
//! ambiguous or unmatched names stay distinct identities. Under-merging is
//! preferred over wrongly merging two different people; the visible cost is
//! an occasional duplicate entry, never a silent merge.
//!
//! # Examples
//!
//! ```
//! use metanorm::identity::{resolve_identities, AgentCandidate};
//! use metanorm::{Agent, Person, Role};
//!
//! let candidates = vec![
//!     AgentCandidate::new(
//!         Agent::Person(Person::new(Some("Christoph".into()), Some("Foerste".into()))),
//!         Role::Creator,
//!     ),
//!     AgentCandidate::new(
//!         Agent::Person(Person::new(Some("Christoph".into()), Some("Förste".into()))),
//!         Role::ContactPerson,
//!     ),
//! ];
//!
//! let resolved = resolve_identities(candidates);
//! assert_eq!(resolved.authors.len(), 1);
//! assert!(resolved.authors[0].is_contact);
//! assert!(resolved.contributors.is_empty());
//! ```

use smallvec::SmallVec;

use crate::resource::{Agent, AgentLink};
use crate::roles::Role;

/// One appearance of an agent in the input, under one role label.
#[derive(Debug, Clone)]
pub struct AgentCandidate {
    /// The agent as it appeared in the source
    pub agent: Agent,
    /// The role label this appearance carried
    pub role: Role,
    /// Contact email attached to this appearance
    pub email: Option<String>,
    /// Contact website attached to this appearance
    pub website: Option<String>,
}

impl AgentCandidate {
    /// Create a candidate without contact metadata.
    #[must_use]
    pub fn new(agent: Agent, role: Role) -> Self {
        AgentCandidate {
            agent,
            role,
            email: None,
            website: None,
        }
    }

    /// Attach a contact email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attach a contact website.
    #[must_use]
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }
}

/// Result of identity resolution: author and contributor link lists.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAgents {
    /// Authors in first-seen order, contact flags set
    pub authors: Vec<AgentLink>,
    /// Contributors in first-seen order, authors filtered out
    pub contributors: Vec<AgentLink>,
}

/// One logical identity under construction. Holding the first member
/// separately keeps the group non-empty by construction.
#[derive(Debug)]
struct Group {
    key: String,
    identifier: Option<String>,
    first: AgentCandidate,
    rest: Vec<AgentCandidate>,
}

impl Group {
    fn start(key: String, candidate: AgentCandidate) -> Self {
        Group {
            key,
            identifier: candidate.agent.identifier().map(str::to_string),
            first: candidate,
            rest: Vec::new(),
        }
    }

    /// A candidate joins this group when its key matches and its identifier
    /// does not conflict. Empty keys never match anything: two anonymous
    /// appearances stay two identities (under-merge).
    fn accepts(&self, key: &str, identifier: Option<&str>) -> bool {
        if key.is_empty() || self.key != key {
            return false;
        }
        match (self.identifier.as_deref(), identifier) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }

    fn admit(&mut self, candidate: AgentCandidate) {
        if self.identifier.is_none() {
            self.identifier = candidate.agent.identifier().map(str::to_string);
        }
        self.rest.push(candidate);
    }
}

/// Deduplicate agent appearances into canonical per-resource identities.
///
/// Groups candidates by normalized display-name key ([`crate::normalize`]).
/// Each group becomes one logical person or institution, regardless of how
/// many times or under how many role labels it appeared:
///
/// - the canonical display name comes from the first-seen member;
/// - roles accumulate across members in first-seen order, de-duplicated;
/// - an ORCID (or ROR) present on any member attaches to the identity;
///   two same-named candidates with *different* identifiers stay separate;
/// - the group is flagged contact if any member carries a contact role,
///   and contact metadata (email, website) is sourced preferentially from
///   that member, even when it is not the one naming the identity;
/// - affiliations are unioned in first-seen order.
///
/// Groups holding an authorship role go to `authors` only; a person who is
/// both an author and, under a different spelling, a point of contact does
/// not additionally appear as a contributor. Remaining groups become
/// contributors.
#[must_use]
pub fn resolve_identities(candidates: impl IntoIterator<Item = AgentCandidate>) -> ResolvedAgents {
    let mut groups: Vec<Group> = Vec::new();

    for candidate in candidates {
        let key = candidate.agent.identity_key();
        let identifier = candidate.agent.identifier();

        let position = groups
            .iter()
            .position(|g| g.accepts(&key, identifier));
        match position {
            Some(index) => groups[index].admit(candidate),
            None => groups.push(Group::start(key, candidate)),
        }
    }

    let mut resolved = ResolvedAgents::default();
    for group in groups {
        let link = collapse_group(group);
        if link.roles.iter().any(Role::is_authorship) {
            resolved.authors.push(link);
        } else {
            resolved.contributors.push(link);
        }
    }

    for (position, link) in resolved.authors.iter_mut().enumerate() {
        link.position = position;
    }
    for (position, link) in resolved.contributors.iter_mut().enumerate() {
        link.position = position;
    }

    tracing::debug!(
        authors = resolved.authors.len(),
        contributors = resolved.contributors.len(),
        "identity resolution complete"
    );
    resolved
}

/// Collapse one group of appearances into a single link.
fn collapse_group(group: Group) -> AgentLink {
    let Group { first, rest, .. } = group;

    let mut roles: SmallVec<[Role; 4]> = SmallVec::new();
    let mut is_contact = false;
    let mut contact_email = None;
    let mut contact_website = None;
    let mut fallback_email = None;
    let mut fallback_website = None;

    let mut agent = first.agent.clone();
    for member in std::iter::once(&first).chain(rest.iter()) {
        if !roles.contains(&member.role) {
            roles.push(member.role);
        }
        if member.role.is_contact() {
            is_contact = true;
            if contact_email.is_none() {
                contact_email = member.email.clone();
            }
            if contact_website.is_none() {
                contact_website = member.website.clone();
            }
        }
        if fallback_email.is_none() {
            fallback_email = member.email.clone();
        }
        if fallback_website.is_none() {
            fallback_website = member.website.clone();
        }
        merge_agent_details(&mut agent, &member.agent);
    }

    AgentLink {
        agent,
        position: 0,
        roles,
        email: contact_email.or(fallback_email),
        website: contact_website.or(fallback_website),
        is_contact,
    }
}

/// Fold identifier and affiliations from a later appearance into the
/// canonical agent. The display name of the first appearance wins.
fn merge_agent_details(canonical: &mut Agent, other: &Agent) {
    match (canonical, other) {
        (Agent::Person(c), Agent::Person(o)) => {
            if c.orcid.is_none() {
                c.orcid = o.orcid.clone();
            }
            for affiliation in &o.affiliations {
                if !c.affiliations.contains(affiliation) {
                    c.affiliations.push(affiliation.clone());
                }
            }
        },
        (Agent::Institution(c), Agent::Institution(o)) => {
            if c.ror.is_none() {
                c.ror = o.ror.clone();
            }
        },
        // Person/institution appearances never share a key in practice;
        // if they do, the first-seen variant stands (under-merge)
        _ => {},
    }
}

/// Decide whether a pre-existing stored agent may be reused for a candidate.
///
/// Reuse requires the normalized display-name keys to match; an identifier
/// match alone is never sufficient. When both sides carry an identifier the
/// identifiers must also be equal. This prevents an incorrectly associated
/// identifier in the input from silently renaming or merging an unrelated
/// existing record.
///
/// # Examples
///
/// ```
/// use metanorm::identity::can_reuse_existing;
/// use metanorm::{Agent, Person};
///
/// let mut stored = Person::new(Some("Christoph".into()), Some("Förste".into()));
/// stored.orcid = Some("0000-0002-1825-0097".into());
/// let stored = Agent::Person(stored);
///
/// // Same identifier, different person: not reused
/// let mut other = Person::new(Some("Maria".into()), Some("Weber".into()));
/// other.orcid = Some("0000-0002-1825-0097".into());
/// assert!(!can_reuse_existing(&stored, &Agent::Person(other)));
/// ```
#[must_use]
pub fn can_reuse_existing(existing: &Agent, candidate: &Agent) -> bool {
    let key = candidate.identity_key();
    if key.is_empty() || existing.identity_key() != key {
        return false;
    }
    match (existing.identifier(), candidate.identifier()) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Find the first stored agent a candidate may be persisted as.
///
/// Returns `None` when no stored agent qualifies under
/// [`can_reuse_existing`]; the caller then creates a new agent row.
#[must_use]
pub fn find_reusable<'a>(existing: &'a [Agent], candidate: &Agent) -> Option<&'a Agent> {
    existing.iter().find(|e| can_reuse_existing(e, candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Institution, Person};

    fn person(given: &str, family: &str) -> Agent {
        Agent::Person(Person::new(Some(given.into()), Some(family.into())))
    }

    fn person_with_orcid(given: &str, family: &str, orcid: &str) -> Agent {
        let mut p = Person::new(Some(given.into()), Some(family.into()));
        p.orcid = Some(orcid.into());
        Agent::Person(p)
    }

    #[test]
    fn test_umlaut_spellings_collapse_to_one_author_with_contact() {
        let resolved = resolve_identities(vec![
            AgentCandidate::new(person("Christoph", "Foerste"), Role::Creator),
            AgentCandidate::new(person("Christoph", "Förste"), Role::ContactPerson)
                .with_email("foerste@example.org"),
        ]);

        assert_eq!(resolved.authors.len(), 1);
        assert!(resolved.contributors.is_empty());

        let author = &resolved.authors[0];
        assert!(author.is_contact);
        // Display name from the first-seen appearance
        assert_eq!(author.agent.display_name(), "Foerste, Christoph");
        // Contact metadata from the contact-role appearance
        assert_eq!(author.email.as_deref(), Some("foerste@example.org"));
        assert_eq!(author.roles.as_slice(), &[Role::Creator, Role::ContactPerson]);
    }

    #[test]
    fn test_orcid_attaches_from_any_appearance() {
        let resolved = resolve_identities(vec![
            AgentCandidate::new(person("Maria", "Weber"), Role::Creator),
            AgentCandidate::new(
                person_with_orcid("Maria", "Weber", "0000-0001-5000-0007"),
                Role::DataCurator,
            ),
        ]);

        assert_eq!(resolved.authors.len(), 1);
        let Agent::Person(p) = &resolved.authors[0].agent else {
            panic!("expected a person");
        };
        assert_eq!(p.orcid.as_deref(), Some("0000-0001-5000-0007"));
    }

    #[test]
    fn test_same_name_different_orcid_stays_distinct() {
        let resolved = resolve_identities(vec![
            AgentCandidate::new(
                person_with_orcid("Jan", "Schmidt", "0000-0001-0000-0001"),
                Role::Creator,
            ),
            AgentCandidate::new(
                person_with_orcid("Jan", "Schmidt", "0000-0002-0000-0002"),
                Role::Creator,
            ),
        ]);

        assert_eq!(resolved.authors.len(), 2);
    }

    #[test]
    fn test_roles_accumulate_first_seen_deduplicated() {
        let resolved = resolve_identities(vec![
            AgentCandidate::new(person("Maria", "Weber"), Role::Creator),
            AgentCandidate::new(person("Maria", "Weber"), Role::DataCurator),
            AgentCandidate::new(person("Maria", "Weber"), Role::Creator),
        ]);

        assert_eq!(resolved.authors.len(), 1);
        assert_eq!(
            resolved.authors[0].roles.as_slice(),
            &[Role::Creator, Role::DataCurator]
        );
    }

    #[test]
    fn test_contributor_matching_author_is_dropped() {
        let resolved = resolve_identities(vec![
            AgentCandidate::new(person("Maria", "Weber"), Role::Creator),
            AgentCandidate::new(person("Anna", "Lang"), Role::DataCollector),
            AgentCandidate::new(person("Maria", "Weber"), Role::DataCurator),
        ]);

        assert_eq!(resolved.authors.len(), 1);
        assert_eq!(resolved.contributors.len(), 1);
        assert_eq!(resolved.contributors[0].agent.display_name(), "Lang, Anna");
    }

    #[test]
    fn test_contact_only_group_becomes_contributor() {
        let resolved = resolve_identities(vec![
            AgentCandidate::new(person("Maria", "Weber"), Role::Creator),
            AgentCandidate::new(person("Tom", "Richter"), Role::ContactPerson),
        ]);

        assert_eq!(resolved.authors.len(), 1);
        assert!(!resolved.authors[0].is_contact);
        assert_eq!(resolved.contributors.len(), 1);
        assert!(resolved.contributors[0].is_contact);
    }

    #[test]
    fn test_anonymous_appearances_stay_distinct() {
        let anonymous = Agent::Person(Person::new(None, None));
        let resolved = resolve_identities(vec![
            AgentCandidate::new(anonymous.clone(), Role::DataCollector),
            AgentCandidate::new(anonymous, Role::DataCollector),
        ]);

        // Never raises; under-merge keeps both
        assert_eq!(resolved.contributors.len(), 2);
    }

    #[test]
    fn test_positions_follow_first_seen_order() {
        let resolved = resolve_identities(vec![
            AgentCandidate::new(person("A", "First"), Role::Creator),
            AgentCandidate::new(person("B", "Second"), Role::Creator),
            AgentCandidate::new(person("C", "Third"), Role::DataCollector),
        ]);

        assert_eq!(resolved.authors[0].position, 0);
        assert_eq!(resolved.authors[0].agent.display_name(), "First, A");
        assert_eq!(resolved.authors[1].position, 1);
        assert_eq!(resolved.contributors[0].position, 0);
    }

    #[test]
    fn test_institution_whitespace_dedup() {
        let resolved = resolve_identities(vec![
            AgentCandidate::new(
                Agent::Institution(Institution::new("GFZ  Potsdam")),
                Role::HostingInstitution,
            ),
            AgentCandidate::new(
                Agent::Institution(Institution::new("gfz potsdam")),
                Role::Distributor,
            ),
        ]);

        assert_eq!(resolved.contributors.len(), 1);
        assert_eq!(
            resolved.contributors[0].roles.as_slice(),
            &[Role::HostingInstitution, Role::Distributor]
        );
    }

    #[test]
    fn test_affiliations_union_in_order() {
        let mut a = Person::new(Some("Maria".into()), Some("Weber".into()));
        a.affiliations.push("GFZ Potsdam".to_string());
        let mut b = Person::new(Some("Maria".into()), Some("Weber".into()));
        b.affiliations.push("University of Potsdam".to_string());
        b.affiliations.push("GFZ Potsdam".to_string());

        let resolved = resolve_identities(vec![
            AgentCandidate::new(Agent::Person(a), Role::Creator),
            AgentCandidate::new(Agent::Person(b), Role::DataCurator),
        ]);

        let Agent::Person(p) = &resolved.authors[0].agent else {
            panic!("expected a person");
        };
        assert_eq!(p.affiliations, vec!["GFZ Potsdam", "University of Potsdam"]);
    }

    #[test]
    fn test_reuse_requires_name_and_identifier_agreement() {
        let stored = person_with_orcid("Christoph", "Förste", "0000-0002-1825-0097");

        // Identifier matches but the name does not: never reused
        let renamed = person_with_orcid("Maria", "Weber", "0000-0002-1825-0097");
        assert!(!can_reuse_existing(&stored, &renamed));

        // Name matches, identifier matches: reused
        let same = person_with_orcid("Christoph", "Foerste", "0000-0002-1825-0097");
        assert!(can_reuse_existing(&stored, &same));

        // Name matches, candidate has no identifier: reused
        let no_id = person("Christoph", "Foerste");
        assert!(can_reuse_existing(&stored, &no_id));

        // Name matches, identifiers conflict: not reused
        let other_orcid = person_with_orcid("Christoph", "Foerste", "0000-0001-0000-0001");
        assert!(!can_reuse_existing(&stored, &other_orcid));
    }

    #[test]
    fn test_find_reusable() {
        let stored = vec![
            person("Anna", "Lang"),
            person_with_orcid("Christoph", "Förste", "0000-0002-1825-0097"),
        ];

        let candidate = person("Christoph", "Foerste");
        let found = find_reusable(&stored, &candidate).expect("should reuse by identity");
        assert_eq!(found.display_name(), "Förste, Christoph");

        let unknown = person("Nils", "Neu");
        assert!(find_reusable(&stored, &unknown).is_none());
    }
}
