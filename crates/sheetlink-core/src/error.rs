use thiserror::Error;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors raised by a tabular store adapter.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("backing store rejected credentials: {0}")]
    Unauthorized(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("backing resource not found: {0}")]
    NotFound(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage request failed: {0}")]
    Request(String),
    #[error("storage is misconfigured: {0}")]
    Configuration(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },
}
