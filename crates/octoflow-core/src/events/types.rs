//! Event types for the change notification system.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Type of change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeEventType {
    /// Record was created
    Created,
    /// Record was updated
    Updated,
    /// Record was deleted
    Deleted,
}

impl ChangeEventType {
    /// Returns the string representation of the event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeEventType::Created => "created",
            ChangeEventType::Updated => "updated",
            ChangeEventType::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for ChangeEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record type tag carried on every change event.
///
/// Consumers filter on this before doing anything else; the reconciliation
/// controller only reacts to [`Kind::Integration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Integration,
    Connection,
    Connector,
}

impl Kind {
    /// Returns the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Integration => "integration",
            Kind::Connection => "connection",
            Kind::Connector => "connector",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event representing a change to a stored record.
///
/// Deliberately carries no record payload: anyone acting on an event is
/// expected to re-fetch the record, so a stale payload cannot mislead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Type of change (created, updated, deleted)
    pub event_type: ChangeEventType,
    /// Record type tag
    pub kind: Kind,
    /// Record id
    pub id: String,
    /// Timestamp of the event
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl ChangeEvent {
    /// Create a new change event.
    pub fn new(event_type: ChangeEventType, kind: Kind, id: impl Into<String>) -> Self {
        Self {
            event_type,
            kind,
            id: id.into(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Create a "created" event.
    pub fn created(kind: Kind, id: impl Into<String>) -> Self {
        Self::new(ChangeEventType::Created, kind, id)
    }

    /// Create an "updated" event.
    pub fn updated(kind: Kind, id: impl Into<String>) -> Self {
        Self::new(ChangeEventType::Updated, kind, id)
    }

    /// Create a "deleted" event.
    pub fn deleted(kind: Kind, id: impl Into<String>) -> Self {
        Self::new(ChangeEventType::Deleted, kind, id)
    }

    /// Check if this event concerns the given record kind.
    pub fn is_kind(&self, kind: Kind) -> bool {
        self.kind == kind
    }
}
