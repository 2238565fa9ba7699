use crate::error::StorageError;
use crate::memory::MemoryObjectStore;
use crate::objects::{GetObjectOutput, ObjectStore};
use crate::s3::S3ObjectStore;

/// The object store selected at startup.
pub enum StoreBackend {
    S3(S3ObjectStore),
    Memory(MemoryObjectStore),
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::S3(_) => "s3",
            StoreBackend::Memory(_) => "memory",
        }
    }
}

impl ObjectStore for StoreBackend {
    async fn get_object(&self, key: &str) -> Result<GetObjectOutput, StorageError> {
        match self {
            StoreBackend::S3(s) => s.get_object(key).await,
            StoreBackend::Memory(m) => m.get_object(key).await,
        }
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        match self {
            StoreBackend::S3(s) => s.put_object(key, body, content_type).await,
            StoreBackend::Memory(m) => m.put_object(key, body, content_type).await,
        }
    }

    async fn put_object_if_match(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
        expected_etag: &str,
    ) -> Result<String, StorageError> {
        match self {
            StoreBackend::S3(s) => {
                s.put_object_if_match(key, body, content_type, expected_etag)
                    .await
            }
            StoreBackend::Memory(m) => {
                m.put_object_if_match(key, body, content_type, expected_etag)
                    .await
            }
        }
    }

    async fn put_object_if_absent(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        match self {
            StoreBackend::S3(s) => s.put_object_if_absent(key, body, content_type).await,
            StoreBackend::Memory(m) => m.put_object_if_absent(key, body, content_type).await,
        }
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        match self {
            StoreBackend::S3(s) => s.delete_object(key).await,
            StoreBackend::Memory(m) => m.delete_object(key).await,
        }
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        match self {
            StoreBackend::S3(s) => s.list_objects(prefix).await,
            StoreBackend::Memory(m) => m.list_objects(prefix).await,
        }
    }
}
