//! EventedStore - A store wrapper that emits change events after mutations.
//!
//! This wrapper delegates all operations to an inner store implementation
//! while emitting events to a broadcaster after successful operations.
//!
//! # Example
//!
//! ```ignore
//! use octoflow_storage::EventedStore;
//! use octoflow_core::events::EventBroadcaster;
//!
//! let broadcaster = EventBroadcaster::new_shared();
//! let store = EventedStore::new(memory_store, broadcaster);
//!
//! // After this, an updated event will be emitted to the broadcaster
//! store.update(integration).await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use octoflow_core::Integration;
use octoflow_core::events::{EventBroadcaster, Kind};
use tracing::debug;

use crate::error::StorageError;
use crate::traits::IntegrationStore;
use crate::types::ListResult;

/// A store wrapper that emits events after successful mutations.
///
/// Events are emitted **after** the operation succeeds, ensuring that
/// events only correspond to actual changes in the store. Reads never
/// emit.
pub struct EventedStore<S: IntegrationStore> {
    /// The inner store implementation.
    inner: S,
    /// The event broadcaster.
    broadcaster: Arc<EventBroadcaster>,
}

impl<S: IntegrationStore> EventedStore<S> {
    /// Create a new evented store wrapper.
    pub fn new(inner: S, broadcaster: Arc<EventBroadcaster>) -> Self {
        Self { inner, broadcaster }
    }

    /// Get a reference to the inner store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Get a reference to the broadcaster.
    pub fn broadcaster(&self) -> &Arc<EventBroadcaster> {
        &self.broadcaster
    }

    fn emit_created(&self, id: &str) {
        if self.broadcaster.subscriber_count() == 0 {
            return;
        }
        let count = self.broadcaster.send_created(Kind::Integration, id);
        debug!(integration_id = %id, subscribers = count, "Emitted created event");
    }

    fn emit_updated(&self, id: &str) {
        if self.broadcaster.subscriber_count() == 0 {
            return;
        }
        let count = self.broadcaster.send_updated(Kind::Integration, id);
        debug!(integration_id = %id, subscribers = count, "Emitted updated event");
    }

    fn emit_deleted(&self, id: &str) {
        if self.broadcaster.subscriber_count() == 0 {
            return;
        }
        let count = self.broadcaster.send_deleted(Kind::Integration, id);
        debug!(integration_id = %id, subscribers = count, "Emitted deleted event");
    }
}

#[async_trait]
impl<S: IntegrationStore> IntegrationStore for EventedStore<S> {
    async fn fetch(&self, id: &str) -> Result<Option<Integration>, StorageError> {
        // Read operations don't emit events
        self.inner.fetch(id).await
    }

    async fn fetch_all(&self) -> Result<ListResult<Integration>, StorageError> {
        // Read operations don't emit events
        self.inner.fetch_all().await
    }

    async fn create(&self, integration: Integration) -> Result<Integration, StorageError> {
        let result = self.inner.create(integration).await?;

        // Emit event after successful create
        if let Some(id) = result.id.as_deref() {
            self.emit_created(id);
        }

        Ok(result)
    }

    async fn update(&self, integration: Integration) -> Result<Integration, StorageError> {
        let result = self.inner.update(integration).await?;

        // Emit event after successful update
        if let Some(id) = result.id.as_deref() {
            self.emit_updated(id);
        }

        Ok(result)
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.inner.delete(id).await?;

        // Emit event after successful delete
        self.emit_deleted(id);

        Ok(())
    }
}

impl<S: IntegrationStore> std::fmt::Debug for EventedStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventedStore")
            .field("subscriber_count", &self.broadcaster.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octoflow_core::events::ChangeEventType;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    /// Minimal map-backed store for exercising the decorator.
    #[derive(Default)]
    struct MapStore {
        records: Mutex<HashMap<String, Integration>>,
    }

    #[async_trait]
    impl IntegrationStore for MapStore {
        async fn fetch(&self, id: &str) -> Result<Option<Integration>, StorageError> {
            Ok(self.records.lock().await.get(id).cloned())
        }

        async fn fetch_all(&self) -> Result<ListResult<Integration>, StorageError> {
            Ok(ListResult::of(
                self.records.lock().await.values().cloned().collect(),
            ))
        }

        async fn create(&self, integration: Integration) -> Result<Integration, StorageError> {
            let integration = if integration.id.is_none() {
                integration.with_id("generated")
            } else {
                integration
            };
            let id = integration.id.clone().ok_or(StorageError::MissingId)?;
            self.records.lock().await.insert(id, integration.clone());
            Ok(integration)
        }

        async fn update(&self, integration: Integration) -> Result<Integration, StorageError> {
            let id = integration.id.clone().ok_or(StorageError::MissingId)?;
            let mut records = self.records.lock().await;
            if !records.contains_key(&id) {
                return Err(StorageError::not_found(id));
            }
            records.insert(id, integration.clone());
            Ok(integration)
        }

        async fn delete(&self, id: &str) -> Result<(), StorageError> {
            self.records
                .lock()
                .await
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| StorageError::not_found(id))
        }
    }

    #[tokio::test]
    async fn test_update_emits_event() {
        let broadcaster = EventBroadcaster::new_shared();
        let store = EventedStore::new(MapStore::default(), broadcaster.clone());
        let mut receiver = broadcaster.subscribe();

        let created = store.create(Integration::new("orders-sync")).await.unwrap();
        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event_type, ChangeEventType::Created);

        store.update(created).await.unwrap();
        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event_type, ChangeEventType::Updated);
        assert_eq!(event.kind, Kind::Integration);
        assert_eq!(event.id, "generated");
    }

    #[tokio::test]
    async fn test_failed_update_emits_nothing() {
        let broadcaster = EventBroadcaster::new_shared();
        let store = EventedStore::new(MapStore::default(), broadcaster.clone());
        let mut receiver = broadcaster.subscribe();

        let missing = Integration::new("ghost").with_id("nope");
        assert!(store.update(missing).await.is_err());

        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_reads_emit_nothing() {
        let broadcaster = EventBroadcaster::new_shared();
        let store = EventedStore::new(MapStore::default(), broadcaster.clone());
        let mut receiver = broadcaster.subscribe();

        assert!(store.fetch("absent").await.unwrap().is_none());
        assert_eq!(store.fetch_all().await.unwrap().total, 0);

        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_emits_event() {
        let broadcaster = EventBroadcaster::new_shared();
        let store = EventedStore::new(MapStore::default(), broadcaster.clone());

        store
            .create(Integration::new("orders-sync").with_id("i1"))
            .await
            .unwrap();

        let mut receiver = broadcaster.subscribe();
        store.delete("i1").await.unwrap();

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event_type, ChangeEventType::Deleted);
        assert_eq!(event.id, "i1");
    }
}
