//! In-flight tracker: markers for reconciliation work currently underway.
//!
//! A marker is keyed on `"{desired_status}:{id}"` and exists from the
//! moment a dispatch begins until the record is observed converged (or the
//! dispatch turns out to be stale). A handler failure does NOT remove the
//! marker: event-driven triggers stay suppressed during the retry window
//! and the timer-driven re-check, which bypasses the marker entirely, owns
//! the retry.

use dashmap::DashSet;
use octoflow_core::IntegrationStatus;

/// Concurrency-safe set of in-flight markers.
///
/// Entries are written only from the controller's worker task and read from
/// the event-subscription task, so the set must tolerate concurrent access
/// but sees a single writer.
#[derive(Debug, Default)]
pub struct InFlightTracker {
    markers: DashSet<String>,
}

impl InFlightTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self {
            markers: DashSet::new(),
        }
    }

    /// The marker key for a record chasing a desired status.
    pub fn key(desired: IntegrationStatus, id: &str) -> String {
        format!("{desired}:{id}")
    }

    /// Mark work as underway. Returns false if the marker was already set.
    pub fn begin(&self, key: String) -> bool {
        self.markers.insert(key)
    }

    /// Whether work is underway for the given key.
    pub fn contains(&self, key: &str) -> bool {
        self.markers.contains(key)
    }

    /// Clear a marker. Harmless when no such key exists.
    pub fn finish(&self, key: &str) -> bool {
        self.markers.remove(key).is_some()
    }

    /// Number of markers currently set.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether no work is tracked as underway.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
