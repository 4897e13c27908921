use sheetlink_core::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MappingError>;

#[derive(Debug, Clone, Error)]
pub enum MappingError {
    #[error("short url already exists: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
