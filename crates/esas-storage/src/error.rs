use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("precondition failed for key: {key}")]
    PreconditionFailed { key: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("GetObject error: {0}")]
    GetObject(String),

    #[error("PutObject error: {0}")]
    PutObject(String),

    #[error("DeleteObject error: {0}")]
    DeleteObject(String),

    #[error("ListObjects error: {0}")]
    ListObjects(String),

    #[error("storage did not respond within {0:?}")]
    Timeout(Duration),

    #[error("storage config error: {0}")]
    Config(String),
}

impl StorageError {
    /// Whether the store itself failed, as opposed to the request being
    /// answered with a definite "no".
    pub fn is_unavailable(&self) -> bool {
        !matches!(
            self,
            StorageError::NotFound { .. }
                | StorageError::PreconditionFailed { .. }
                | StorageError::Serialization(_)
        )
    }
}

/// Turn `NotFound` into `Ok(None)`.
pub trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, StorageError>;
}

impl<T> OptionalExt<T> for Result<T, StorageError> {
    fn optional(self) -> Result<Option<T>, StorageError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(StorageError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
