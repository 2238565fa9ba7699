use esas_storage::error::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    /// No screening is still held by this guest token. Also returned when
    /// the token was already linked.
    #[error("no unlinked screenings for guest identifier")]
    GuestIdentifierNotFound,

    /// Another request changed a record between our read and our write.
    /// Exactly one of the racing requests wins; the caller may retry once.
    #[error("{key} was modified by a concurrent link")]
    ConcurrentLinkConflict { key: String },

    #[error("invalid account identifier")]
    InvalidAccount,

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] StorageError),
}

impl From<StorageError> for LinkError {
    fn from(e: StorageError) -> Self {
        LinkError::StorageUnavailable(e)
    }
}
