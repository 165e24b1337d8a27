//! Desired-state reconciliation controller for integration records.
//!
//! The controller subscribes to change notifications, sweeps all records at
//! startup, and for every record whose desired status differs from its
//! current status looks up a status-change handler and dispatches work.
//! Completed work is persisted back to the store together with revision
//! bookkeeping, and every dispatched record is re-checked after a fixed
//! delay as a safety net against missed notifications and failed attempts.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  change events   ┌──────────────┐
//! │ EventBroad-  │ ───────────────▶ │ subscription │  filter + forward, O(1)
//! │ caster       │                  │ task         │
//! └──────────────┘                  └──────┬───────┘
//!                                          ▼
//!                                   ┌──────────────┐   all record reads,
//!                  startup sweep ──▶│ worker task  │   writes and handler
//!                                   │ (single)     │   runs happen here
//!                                   └──────┬───────┘
//!                                          │ reschedule(id)
//!                                          ▼
//!                                   ┌──────────────┐
//!                                   │ scheduler    │  fixed-delay re-checks,
//!                                   │ task         │  re-enqueues only
//!                                   └──────────────┘
//! ```
//!
//! Because there is exactly one worker, no two dispatches execute
//! concurrently and a record's successive checks never overlap; the
//! [`InFlightTracker`] additionally suppresses duplicate event-driven
//! dispatch while a transition is underway.

pub mod config;
pub mod controller;
pub mod handler;
pub mod registry;
mod scheduler;
pub mod tracker;

pub use config::ControllerConfig;
pub use controller::{ControllerError, IntegrationController};
pub use handler::{HandlerError, StatusChangeHandler, StatusUpdate};
pub use registry::HandlerRegistry;
pub use tracker::InFlightTracker;
