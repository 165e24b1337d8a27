//! Storage traits for the integration store abstraction layer.
//!
//! This module defines the contract every store backend must implement.

use async_trait::async_trait;
use octoflow_core::Integration;

use crate::error::StorageError;
use crate::types::ListResult;

/// The store trait all integration record backends implement.
///
/// Implementations must be thread-safe (`Send + Sync`). Consumers that act
/// on change notifications are expected to re-fetch through this trait
/// rather than trust event payloads.
///
/// # Example
///
/// ```ignore
/// use octoflow_storage::{IntegrationStore, StorageError};
/// use octoflow_core::Integration;
///
/// async fn require(store: &dyn IntegrationStore, id: &str) -> Result<Integration, StorageError> {
///     store
///         .fetch(id)
///         .await?
///         .ok_or_else(|| StorageError::not_found(id))
/// }
/// ```
#[async_trait]
pub trait IntegrationStore: Send + Sync {
    /// Reads a record by id.
    ///
    /// Returns `None` if the record does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing records.
    async fn fetch(&self, id: &str) -> Result<Option<Integration>, StorageError>;

    /// Reads all records.
    async fn fetch_all(&self) -> Result<ListResult<Integration>, StorageError>;

    /// Creates a new record, assigning an id when the record has none.
    ///
    /// Returns the record as persisted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if a record with the same id exists.
    async fn create(&self, integration: Integration) -> Result<Integration, StorageError>;

    /// Updates an existing record.
    ///
    /// Returns the record as persisted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::MissingId` if the record carries no id.
    /// Returns `StorageError::NotFound` if the id is unknown.
    async fn update(&self, integration: Integration) -> Result<Integration, StorageError>;

    /// Deletes a record by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the record does not exist.
    async fn delete(&self, id: &str) -> Result<(), StorageError>;
}
