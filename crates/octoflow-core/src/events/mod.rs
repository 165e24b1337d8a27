//! Change notification infrastructure.
//!
//! Every mutation of a stored record is announced as a [`ChangeEvent`] on
//! the [`EventBroadcaster`], a thin wrapper around a tokio broadcast
//! channel. Subscribers receive events best-effort: delivery is not
//! exactly-once, slow receivers may lag, and consumers are expected to
//! re-fetch the record rather than trust a payload — which is why events
//! carry only the kind and id of what changed.
//!
//! # Module Structure
//!
//! - [`types`]: Event type definitions (`ChangeEvent`, `ChangeEventType`, `Kind`)
//! - [`broadcaster`]: Event broadcasting infrastructure

pub mod broadcaster;
pub mod types;

// Re-export main types for convenience
pub use broadcaster::EventBroadcaster;
pub use types::{ChangeEvent, ChangeEventType, Kind};
