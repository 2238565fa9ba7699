use std::future::Future;

use crate::error::StorageError;

/// Result of a GET operation, including the body and ETag.
#[derive(Debug, Clone)]
pub struct GetObjectOutput {
    pub body: Vec<u8>,
    pub etag: Option<String>,
    pub content_type: Option<String>,
}

/// Key/value object storage with ETag-based conditional writes.
///
/// Every conditional write either applies atomically or fails with
/// [`StorageError::PreconditionFailed`]; nothing is locked between a read
/// and the write that depends on it.
pub trait ObjectStore: Send + Sync {
    /// Fetch an object. Missing keys are [`StorageError::NotFound`].
    fn get_object(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<GetObjectOutput, StorageError>> + Send;

    /// Unconditional write. Returns the new ETag.
    fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;

    /// Write only if the stored ETag still equals `expected_etag`.
    fn put_object_if_match(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
        expected_etag: &str,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;

    /// Write only if no object exists at `key`.
    fn put_object_if_absent(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;

    fn delete_object(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// List keys under a prefix, in lexicographic order.
    fn list_objects(
        &self,
        prefix: &str,
    ) -> impl Future<Output = Result<Vec<String>, StorageError>> + Send;
}
