use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;
use crate::objects::ObjectStore;

const JSON: Option<&str> = Some("application/json");

/// Load a JSON object. Returns the deserialized value and its ETag.
pub async fn load_json<T: DeserializeOwned>(
    store: &impl ObjectStore,
    key: &str,
) -> Result<(T, String), StorageError> {
    let output = store.get_object(key).await?;
    let value: T = serde_json::from_slice(&output.body)?;
    let etag = output.etag.unwrap_or_default();
    Ok((value, etag))
}

/// Save a JSON object only if it still has `expected_etag`.
pub async fn save_json_if_match<T: Serialize + Sync>(
    store: &impl ObjectStore,
    key: &str,
    value: &T,
    expected_etag: &str,
) -> Result<String, StorageError> {
    let body = serde_json::to_vec_pretty(value)?;
    store
        .put_object_if_match(key, body, JSON, expected_etag)
        .await
}

/// Create a JSON object, failing with `PreconditionFailed` if one exists.
pub async fn create_json<T: Serialize + Sync>(
    store: &impl ObjectStore,
    key: &str,
    value: &T,
) -> Result<String, StorageError> {
    let body = serde_json::to_vec_pretty(value)?;
    store.put_object_if_absent(key, body, JSON).await
}
