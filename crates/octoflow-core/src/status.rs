//! Status enums for integration records and their deployed revisions.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of an integration record.
///
/// Both the operator-requested (`desired_status`) and the observed
/// (`current_status`) side of a record use this enum. The reconciliation
/// controller drives records whose two statuses differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegrationStatus {
    /// Record exists but nothing has been requested yet
    Draft,
    /// A transition is underway but has not completed
    Pending,
    /// The integration is deployed and running
    Activated,
    /// The integration is deployed but stopped
    Deactivated,
    /// The integration has been torn down
    Deleted,
}

impl IntegrationStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationStatus::Draft => "Draft",
            IntegrationStatus::Pending => "Pending",
            IntegrationStatus::Activated => "Activated",
            IntegrationStatus::Deactivated => "Deactivated",
            IntegrationStatus::Deleted => "Deleted",
        }
    }
}

impl std::fmt::Display for IntegrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IntegrationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(IntegrationStatus::Draft),
            "Pending" => Ok(IntegrationStatus::Pending),
            "Activated" => Ok(IntegrationStatus::Activated),
            "Deactivated" => Ok(IntegrationStatus::Deactivated),
            "Deleted" => Ok(IntegrationStatus::Deleted),
            other => Err(CoreError::invalid_status(other)),
        }
    }
}

/// Deployment state recorded on a revision.
///
/// Derived from the status a transition resolved to; two revisions with the
/// same state describe the same deployment outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevisionState {
    Draft,
    Pending,
    Active,
    Inactive,
    Undeployed,
}

impl RevisionState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionState::Draft => "Draft",
            RevisionState::Pending => "Pending",
            RevisionState::Active => "Active",
            RevisionState::Inactive => "Inactive",
            RevisionState::Undeployed => "Undeployed",
        }
    }
}

impl std::fmt::Display for RevisionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<IntegrationStatus> for RevisionState {
    fn from(status: IntegrationStatus) -> Self {
        match status {
            IntegrationStatus::Draft => RevisionState::Draft,
            IntegrationStatus::Pending => RevisionState::Pending,
            IntegrationStatus::Activated => RevisionState::Active,
            IntegrationStatus::Deactivated => RevisionState::Inactive,
            IntegrationStatus::Deleted => RevisionState::Undeployed,
        }
    }
}
