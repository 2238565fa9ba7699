use std::future::Future;
use std::time::Duration;

use crate::error::StorageError;

/// Run a storage-backed operation with an upper bound on its duration.
///
/// On expiry the operation is dropped and [`StorageError::Timeout`] is
/// returned, converted into the operation's own error type. Callers must
/// not assume any of its writes were applied.
pub async fn with_deadline<T, E, F>(limit: Duration, operation: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<StorageError>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(limit_ms = limit.as_millis() as u64, "storage operation timed out");
            Err(StorageError::Timeout(limit).into())
        }
    }
}
