//! Storage abstraction for integration records.
//!
//! Defines the [`IntegrationStore`] contract every backend implements, the
//! storage error taxonomy, and the [`EventedStore`] decorator that turns
//! successful mutations into change notifications.

pub mod error;
pub mod evented;
pub mod traits;
pub mod types;

pub use error::StorageError;
pub use evented::EventedStore;
pub use traits::IntegrationStore;
pub use types::ListResult;
