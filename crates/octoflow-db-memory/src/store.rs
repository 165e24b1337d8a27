use async_trait::async_trait;
use dashmap::DashMap;
use octoflow_core::Integration;
use octoflow_storage::{IntegrationStore, ListResult, StorageError};
use uuid::Uuid;

/// In-memory store backend using a concurrent hash map.
///
/// Records are cloned on read so callers never observe in-place mutation;
/// the map itself carries no versioning — revision history lives on the
/// record.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: DashMap<String, Integration>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl IntegrationStore for InMemoryStore {
    async fn fetch(&self, id: &str) -> Result<Option<Integration>, StorageError> {
        Ok(self.records.get(id).map(|entry| entry.clone()))
    }

    async fn fetch_all(&self) -> Result<ListResult<Integration>, StorageError> {
        let items: Vec<Integration> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        Ok(ListResult::of(items))
    }

    async fn create(&self, integration: Integration) -> Result<Integration, StorageError> {
        let integration = if integration.id.is_none() {
            integration.with_id(Uuid::new_v4().to_string())
        } else {
            integration
        };
        // id is always present after the assignment above
        let id = integration.id.clone().ok_or(StorageError::MissingId)?;

        if self.records.contains_key(&id) {
            return Err(StorageError::already_exists(id));
        }
        self.records.insert(id, integration.clone());
        Ok(integration)
    }

    async fn update(&self, integration: Integration) -> Result<Integration, StorageError> {
        let id = integration.id.clone().ok_or(StorageError::MissingId)?;

        match self.records.get_mut(&id) {
            Some(mut entry) => {
                *entry = integration.clone();
                Ok(integration)
            }
            None => Err(StorageError::not_found(id)),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(id))
    }
}
