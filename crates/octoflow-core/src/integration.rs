//! The integration record and its revision bookkeeping.
//!
//! An [`Integration`] carries a desired and a current status; the
//! reconciliation controller drives the current status toward the desired
//! one. Every successful transition is reflected in the record's set of
//! [`IntegrationRevision`]s, with version numbers kept stable when a
//! transition merely reconfirms the state already on top.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::status::{IntegrationStatus, RevisionState};

/// A versioned snapshot of an integration's deployed state.
///
/// Versions are assigned lazily when the revision set is recomputed after a
/// transition; see [`Integration::recompute_revisions`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationRevision {
    pub version: u32,
    pub parent_version: u32,
    pub current_state: RevisionState,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

impl IntegrationRevision {
    /// Create a revision for the given state with fresh timestamps.
    pub fn new(version: u32, parent_version: u32, current_state: RevisionState) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            version,
            parent_version,
            current_state,
            created_date: now,
            last_updated: now,
        }
    }

    /// Set the deployment state.
    pub fn with_current_state(mut self, state: RevisionState) -> Self {
        self.current_state = state;
        self
    }

    /// Set version and parent version together.
    pub fn with_version(mut self, version: u32, parent_version: u32) -> Self {
        self.version = version;
        self.parent_version = parent_version;
        self
    }

    /// Whether two revisions describe the same deployment outcome.
    ///
    /// Version and parent version are ignored: a revision that resolves to
    /// the state an existing entry already records replaces that entry
    /// rather than sitting next to it.
    pub fn same_deployment(&self, other: &IntegrationRevision) -> bool {
        self.current_state == other.current_state
    }
}

/// An integration record: the entity the reconciliation controller drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    /// Identity, assigned by the store on create.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub desired_status: Option<IntegrationStatus>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub current_status: Option<IntegrationStatus>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub steps_done: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
    #[serde(default)]
    pub revisions: Vec<IntegrationRevision>,
}

impl Integration {
    /// Create a new, unpersisted record. The store assigns the id.
    pub fn new(name: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: None,
            name: name.into(),
            desired_status: None,
            current_status: None,
            status_message: None,
            steps_done: 0,
            created_date: now,
            last_updated: now,
            revisions: Vec::new(),
        }
    }

    /// Set the id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the desired status.
    pub fn with_desired_status(mut self, status: IntegrationStatus) -> Self {
        self.desired_status = Some(status);
        self
    }

    /// Set the current status.
    pub fn with_current_status(mut self, status: IntegrationStatus) -> Self {
        self.current_status = Some(status);
        self
    }

    /// Set the status message.
    pub fn with_status_message(mut self, message: impl Into<String>) -> Self {
        self.status_message = Some(message.into());
        self
    }

    /// Replace the revision set.
    pub fn with_revisions(mut self, revisions: Vec<IntegrationRevision>) -> Self {
        self.revisions = revisions;
        self
    }

    /// A record whose desired and current status agree (including both
    /// unset) is converged and must never be dispatched to a handler.
    pub fn is_converged(&self) -> bool {
        self.desired_status == self.current_status
    }

    /// Refresh the last-updated timestamp.
    pub fn touch(&mut self) {
        self.last_updated = OffsetDateTime::now_utc();
    }

    /// The most recent revision, by version order.
    pub fn last_revision(&self) -> Option<&IntegrationRevision> {
        self.revisions.iter().max_by_key(|r| r.version)
    }

    /// Build the candidate revision for this record's current deployment:
    /// the next version on top of the latest one, in the state implied by
    /// the current status (Draft when unset).
    pub fn deployed_revision(&self) -> IntegrationRevision {
        let (version, parent_version) = match self.last_revision() {
            Some(last) => (last.version + 1, last.version),
            None => (1, 0),
        };
        let state = self
            .current_status
            .map(RevisionState::from)
            .unwrap_or(RevisionState::Draft);
        IntegrationRevision::new(version, parent_version, state)
    }

    /// Recompute the revision set after a transition resolved to
    /// `new_state`.
    ///
    /// Any existing revision describing the same deployment is replaced,
    /// and when the latest revision already records `new_state` the
    /// candidate inherits its version and parent version instead of
    /// minting a new one. Repeated converge-to-same-state transitions
    /// therefore never bump the version.
    pub fn recompute_revisions(&self, new_state: RevisionState) -> Vec<IntegrationRevision> {
        let candidate = self.deployed_revision().with_current_state(new_state);

        let mut revisions: Vec<IntegrationRevision> = self
            .revisions
            .iter()
            .filter(|r| !r.same_deployment(&candidate))
            .cloned()
            .collect();

        let candidate = match self.last_revision() {
            Some(last) if last.current_state == new_state => {
                candidate.with_version(last.version, last.parent_version)
            }
            _ => candidate,
        };

        revisions.push(candidate);
        revisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activated(version: u32, parent: u32) -> IntegrationRevision {
        IntegrationRevision::new(version, parent, RevisionState::Active)
    }

    #[test]
    fn test_new_integration_is_converged() {
        let integration = Integration::new("orders-sync");
        assert!(integration.is_converged());
        assert!(integration.revisions.is_empty());
        assert_eq!(integration.steps_done, 0);
    }

    #[test]
    fn test_converged_with_matching_statuses() {
        let integration = Integration::new("orders-sync")
            .with_desired_status(IntegrationStatus::Activated)
            .with_current_status(IntegrationStatus::Activated);
        assert!(integration.is_converged());
    }

    #[test]
    fn test_not_converged_when_statuses_differ() {
        let integration = Integration::new("orders-sync")
            .with_desired_status(IntegrationStatus::Activated)
            .with_current_status(IntegrationStatus::Draft);
        assert!(!integration.is_converged());
    }

    #[test]
    fn test_last_revision_by_version() {
        let integration = Integration::new("orders-sync").with_revisions(vec![
            IntegrationRevision::new(2, 1, RevisionState::Inactive),
            activated(1, 0),
        ]);
        assert_eq!(integration.last_revision().unwrap().version, 2);
    }

    #[test]
    fn test_deployed_revision_on_empty_set() {
        let integration = Integration::new("orders-sync");
        let revision = integration.deployed_revision();
        assert_eq!(revision.version, 1);
        assert_eq!(revision.parent_version, 0);
        assert_eq!(revision.current_state, RevisionState::Draft);
    }

    #[test]
    fn test_first_transition_mints_version_one() {
        let integration = Integration::new("orders-sync")
            .with_desired_status(IntegrationStatus::Activated)
            .with_current_status(IntegrationStatus::Draft);
        let revisions = integration.recompute_revisions(RevisionState::Active);
        assert_eq!(revisions.len(), 1);
        assert_eq!(revisions[0].version, 1);
        assert_eq!(revisions[0].current_state, RevisionState::Active);
    }

    #[test]
    fn test_same_state_reconvergence_keeps_version() {
        let integration = Integration::new("orders-sync")
            .with_current_status(IntegrationStatus::Activated)
            .with_revisions(vec![activated(3, 2)]);
        let revisions = integration.recompute_revisions(RevisionState::Active);
        assert_eq!(revisions.len(), 1);
        assert_eq!(revisions[0].version, 3);
        assert_eq!(revisions[0].parent_version, 2);
    }

    #[test]
    fn test_new_state_mints_new_version() {
        let integration = Integration::new("orders-sync")
            .with_current_status(IntegrationStatus::Activated)
            .with_revisions(vec![activated(1, 0)]);
        let revisions = integration.recompute_revisions(RevisionState::Inactive);
        assert_eq!(revisions.len(), 2);
        let top = revisions.iter().max_by_key(|r| r.version).unwrap();
        assert_eq!(top.version, 2);
        assert_eq!(top.parent_version, 1);
        assert_eq!(top.current_state, RevisionState::Inactive);
    }

    #[test]
    fn test_same_deployment_ignores_version() {
        let a = activated(1, 0);
        let b = activated(7, 6);
        assert!(a.same_deployment(&b));
        let c = IntegrationRevision::new(1, 0, RevisionState::Inactive);
        assert!(!a.same_deployment(&c));
    }

    #[test]
    fn test_serialization_round_trip() {
        let integration = Integration::new("orders-sync")
            .with_id("i1")
            .with_desired_status(IntegrationStatus::Activated)
            .with_revisions(vec![activated(1, 0)]);
        let json = serde_json::to_string(&integration).unwrap();
        assert!(json.contains("\"desiredStatus\":\"Activated\""));
        let parsed: Integration = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, integration);
    }
}
