use thiserror::Error;

/// Errors produced by integration store backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Integration not found: {id}")]
    NotFound { id: String },

    #[error("Integration already exists: {id}")]
    AlreadyExists { id: String },

    #[error("Integration has no id")]
    MissingId,

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Create a new NotFound error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a new AlreadyExists error
    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::AlreadyExists { id: id.into() }
    }

    /// Create a new Backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = StorageError::not_found("i1");
        assert_eq!(err.to_string(), "Integration not found: i1");
    }

    #[test]
    fn test_already_exists_message() {
        let err = StorageError::already_exists("i1");
        assert_eq!(err.to_string(), "Integration already exists: i1");
    }

    #[test]
    fn test_backend_message() {
        let err = StorageError::backend("connection refused");
        assert_eq!(err.to_string(), "Storage backend error: connection refused");
    }
}
