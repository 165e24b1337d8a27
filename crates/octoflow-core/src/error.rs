use thiserror::Error;

/// Core error types for OctoFlow operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid integration status: {0}")]
    InvalidStatus(String),

    #[error("Invalid revision state: {0}")]
    InvalidRevisionState(String),

    #[error("Invalid integration data: {message}")]
    InvalidIntegration { message: String },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Time parsing error: {0}")]
    TimeError(#[from] time::error::Parse),
}

impl CoreError {
    /// Create a new InvalidStatus error
    pub fn invalid_status(status: impl Into<String>) -> Self {
        Self::InvalidStatus(status.into())
    }

    /// Create a new InvalidRevisionState error
    pub fn invalid_revision_state(state: impl Into<String>) -> Self {
        Self::InvalidRevisionState(state.into())
    }

    /// Create a new InvalidIntegration error
    pub fn invalid_integration(message: impl Into<String>) -> Self {
        Self::InvalidIntegration {
            message: message.into(),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
