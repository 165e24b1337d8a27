//! Event broadcaster for the change notification system.
//!
//! The `EventBroadcaster` is the bus every store decorator publishes to and
//! every controller subscribes on. It uses tokio's broadcast channel for
//! multi-producer, multi-consumer messaging.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::types::{ChangeEvent, Kind};

/// Default buffer size for the broadcast channel.
/// Events beyond this limit will cause older events to be dropped for slow receivers.
const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Broadcaster for change events.
///
/// Thread-safe and cloneable; multiple subscribers can receive events from
/// a single sender. Dropped or missed events are tolerable for consumers
/// that also sweep and re-check on a timer.
///
/// # Example
///
/// ```
/// use octoflow_core::events::{EventBroadcaster, Kind};
///
/// let broadcaster = EventBroadcaster::new();
/// let mut receiver = broadcaster.subscribe();
///
/// broadcaster.send_updated(Kind::Integration, "i1");
///
/// // Receive in another task
/// // let event = receiver.recv().await.unwrap();
/// ```
#[derive(Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventBroadcaster {
    /// Create a new broadcaster with default buffer size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE)
    }

    /// Create a new broadcaster with custom buffer size.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new broadcaster wrapped in an Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Send a change event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// Returns 0 if there are no active subscribers.
    pub fn send(&self, event: ChangeEvent) -> usize {
        self.sender.send(event).unwrap_or_default()
    }

    /// Send a "record created" event.
    pub fn send_created(&self, kind: Kind, id: impl Into<String>) -> usize {
        self.send(ChangeEvent::created(kind, id))
    }

    /// Send a "record updated" event.
    pub fn send_updated(&self, kind: Kind, id: impl Into<String>) -> usize {
        self.send(ChangeEvent::updated(kind, id))
    }

    /// Send a "record deleted" event.
    pub fn send_deleted(&self, kind: Kind, id: impl Into<String>) -> usize {
        self.send(ChangeEvent::deleted(kind, id))
    }

    /// Subscribe to events.
    ///
    /// Returns a receiver that will receive all events broadcast after
    /// subscription. Events sent before subscription are not received;
    /// dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Check if there are any active subscribers.
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBroadcaster")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::ChangeEventType;

    #[test]
    fn test_broadcaster_creation() {
        let broadcaster = EventBroadcaster::new();
        assert_eq!(broadcaster.subscriber_count(), 0);
        assert!(!broadcaster.has_subscribers());
    }

    #[test]
    fn test_broadcaster_subscribe() {
        let broadcaster = EventBroadcaster::new();
        let _receiver = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);
        assert!(broadcaster.has_subscribers());
    }

    #[test]
    fn test_broadcaster_no_subscribers() {
        let broadcaster = EventBroadcaster::new();
        let count = broadcaster.send_created(Kind::Integration, "i1");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_broadcaster_send_receive() {
        let broadcaster = EventBroadcaster::new();
        let mut receiver = broadcaster.subscribe();

        broadcaster.send_updated(Kind::Integration, "i1");

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event_type, ChangeEventType::Updated);
        assert_eq!(event.kind, Kind::Integration);
        assert_eq!(event.id, "i1");
    }

    #[tokio::test]
    async fn test_broadcaster_multiple_subscribers() {
        let broadcaster = EventBroadcaster::new();
        let mut receiver1 = broadcaster.subscribe();
        let mut receiver2 = broadcaster.subscribe();

        assert_eq!(broadcaster.subscriber_count(), 2);

        let count = broadcaster.send_deleted(Kind::Connection, "c1");
        assert_eq!(count, 2);

        let event1 = receiver1.recv().await.unwrap();
        let event2 = receiver2.recv().await.unwrap();

        assert_eq!(event1.id, "c1");
        assert_eq!(event2.id, "c1");
    }

    #[test]
    fn test_broadcaster_shared() {
        let broadcaster = EventBroadcaster::new_shared();
        let broadcaster2 = broadcaster.clone();

        let _receiver = broadcaster.subscribe();
        assert_eq!(broadcaster2.subscriber_count(), 1);
    }
}
