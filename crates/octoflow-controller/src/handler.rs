//! The status-change handler contract.
//!
//! Handlers are the pluggable units that perform the real work of moving a
//! record toward a target status: standing up a workload, tearing it down,
//! deleting it. They are designed to be:
//! - **Async**: invoked from the controller's worker task, free to await
//!   external systems
//! - **Declarative about scope**: each handler names the target statuses it
//!   knows how to drive records into
//! - **Fallible without consequence to the controller**: a returned error
//!   is noted on the record and retried on the safety-net poll

use async_trait::async_trait;
use octoflow_core::{Integration, IntegrationStatus};

/// Error type for handler execution.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Handler execution failed with a message.
    #[error("Handler execution failed: {0}")]
    Execution(String),

    /// Handler failed against an external system.
    #[error("External system error: {0}")]
    External(String),

    /// Generic error with source.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    /// Create an execution error from a string.
    pub fn execution(msg: impl Into<String>) -> Self {
        HandlerError::Execution(msg.into())
    }

    /// Create an external system error from a string.
    pub fn external(msg: impl Into<String>) -> Self {
        HandlerError::External(msg.into())
    }
}

/// The result a handler reports after driving a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// The status the record resolved to. Required: a handler with nothing
    /// to report returns `None` from `execute` instead.
    pub status: IntegrationStatus,
    /// Optional operator-facing message.
    pub status_message: Option<String>,
    /// How many of the handler's steps have been performed so far.
    pub steps_performed: u32,
}

impl StatusUpdate {
    /// An update carrying only the resulting status.
    pub fn new(status: IntegrationStatus) -> Self {
        Self {
            status,
            status_message: None,
            steps_performed: 0,
        }
    }

    /// An update with a message.
    pub fn with_message(status: IntegrationStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            status_message: Some(message.into()),
            steps_performed: 0,
        }
    }

    /// Set the performed-step count.
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps_performed = steps;
        self
    }
}

/// Trait for status-change handlers.
///
/// # Implementation Notes
///
/// - `execute` runs on the controller's single worker; long-running work
///   stalls reconciliation of other records behind it (a deliberate
///   trade-off — see the crate docs)
/// - Returning `Ok(None)` means "no change needed right now"; nothing is
///   persisted and the record is re-checked on the next poll
/// - Errors never crash the controller; they are rendered onto the
///   record's status message and retried
#[async_trait]
pub trait StatusChangeHandler: Send + Sync {
    /// Unique name for this handler (for logging).
    fn name(&self) -> &str;

    /// The target statuses this handler knows how to drive records into.
    fn trigger_statuses(&self) -> &[IntegrationStatus];

    /// Drive the record toward one of the trigger statuses.
    ///
    /// Returns the resulting status update, or `None` when no change is
    /// needed this cycle.
    async fn execute(
        &self,
        integration: &Integration,
    ) -> Result<Option<StatusUpdate>, HandlerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test that StatusChangeHandler is object-safe
    fn _assert_handler_object_safe(_: &dyn StatusChangeHandler) {}

    #[test]
    fn test_status_update_constructors() {
        let update = StatusUpdate::new(IntegrationStatus::Activated);
        assert_eq!(update.status, IntegrationStatus::Activated);
        assert!(update.status_message.is_none());
        assert_eq!(update.steps_performed, 0);

        let update = StatusUpdate::with_message(IntegrationStatus::Pending, "building").with_steps(2);
        assert_eq!(update.status_message.as_deref(), Some("building"));
        assert_eq!(update.steps_performed, 2);
    }

    #[test]
    fn test_handler_error_rendering() {
        let err = HandlerError::execution("build failed");
        assert_eq!(err.to_string(), "Handler execution failed: build failed");
        let err = HandlerError::external("503 from target platform");
        assert_eq!(err.to_string(), "External system error: 503 from target platform");
    }
}
