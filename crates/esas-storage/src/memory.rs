use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::StorageError;
use crate::objects::{GetObjectOutput, ObjectStore};

struct StoredObject {
    body: Vec<u8>,
    etag: String,
    content_type: Option<String>,
}

/// In-process [`ObjectStore`] with the same conditional-write semantics as
/// S3. Used for local runs without AWS credentials and in tests.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    next_version: AtomicU64,
    writes: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful puts and deletes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, StoredObject>>, StorageError> {
        self.objects
            .lock()
            .map_err(|_| StorageError::Config("memory store lock poisoned".to_string()))
    }

    fn store(
        &self,
        objects: &mut BTreeMap<String, StoredObject>,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> String {
        let version = self.next_version.fetch_add(1, Ordering::SeqCst) + 1;
        let etag = format!("\"{version:016x}\"");
        objects.insert(
            key.to_string(),
            StoredObject {
                body,
                etag: etag.clone(),
                content_type: content_type.map(str::to_string),
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        etag
    }
}

impl ObjectStore for MemoryObjectStore {
    async fn get_object(&self, key: &str) -> Result<GetObjectOutput, StorageError> {
        let objects = self.lock()?;
        let obj = objects.get(key).ok_or_else(|| StorageError::NotFound {
            key: key.to_string(),
        })?;
        Ok(GetObjectOutput {
            body: obj.body.clone(),
            etag: Some(obj.etag.clone()),
            content_type: obj.content_type.clone(),
        })
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        let mut objects = self.lock()?;
        Ok(self.store(&mut objects, key, body, content_type))
    }

    async fn put_object_if_match(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
        expected_etag: &str,
    ) -> Result<String, StorageError> {
        let mut objects = self.lock()?;
        let matches = objects.get(key).map(|obj| obj.etag == expected_etag);
        match matches {
            Some(true) => Ok(self.store(&mut objects, key, body, content_type)),
            Some(false) => Err(StorageError::PreconditionFailed {
                key: key.to_string(),
            }),
            None => Err(StorageError::NotFound {
                key: key.to_string(),
            }),
        }
    }

    async fn put_object_if_absent(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        let mut objects = self.lock()?;
        if objects.contains_key(key) {
            return Err(StorageError::PreconditionFailed {
                key: key.to_string(),
            });
        }
        Ok(self.store(&mut objects, key, body, content_type))
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        let mut objects = self.lock()?;
        if objects.remove(key).is_some() {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let objects = self.lock()?;
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
