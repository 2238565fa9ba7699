use aws_sdk_s3::Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::SdkError;
use aws_smithy_types::byte_stream::ByteStream;

use crate::error::StorageError;
use crate::objects::{GetObjectOutput, ObjectStore};

/// Build an S3 client from the default AWS credential and region chain.
pub async fn build_client() -> Client {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    Client::new(&config)
}

/// [`ObjectStore`] backed by a single S3 bucket.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// S3 answers a failed `If-Match` / `If-None-Match` with 412, or 409 when a
/// conflicting conditional write is in flight.
fn is_precondition_failure<E>(err: &SdkError<E, HttpResponse>) -> bool {
    err.raw_response()
        .map(|r| matches!(r.status().as_u16(), 409 | 412))
        .unwrap_or(false)
}

impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, key: &str) -> Result<GetObjectOutput, StorageError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_no_such_key() {
                    StorageError::NotFound {
                        key: key.to_string(),
                    }
                } else {
                    StorageError::GetObject(err.to_string())
                }
            })?;

        let etag = resp.e_tag().map(|s| s.to_string());
        let content_type = resp.content_type().map(|s| s.to_string());
        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| StorageError::GetObject(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(GetObjectOutput {
            body,
            etag,
            content_type,
        })
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        let mut req = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body));

        if let Some(ct) = content_type {
            req = req.content_type(ct);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| StorageError::PutObject(e.into_service_error().to_string()))?;

        Ok(resp.e_tag().unwrap_or_default().to_string())
    }

    async fn put_object_if_match(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
        expected_etag: &str,
    ) -> Result<String, StorageError> {
        let mut req = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .if_match(expected_etag);

        if let Some(ct) = content_type {
            req = req.content_type(ct);
        }

        let resp = req.send().await.map_err(|e| {
            if is_precondition_failure(&e) {
                StorageError::PreconditionFailed {
                    key: key.to_string(),
                }
            } else {
                StorageError::PutObject(e.into_service_error().to_string())
            }
        })?;

        Ok(resp.e_tag().unwrap_or_default().to_string())
    }

    async fn put_object_if_absent(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        let mut req = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .if_none_match("*");

        if let Some(ct) = content_type {
            req = req.content_type(ct);
        }

        let resp = req.send().await.map_err(|e| {
            if is_precondition_failure(&e) {
                StorageError::PreconditionFailed {
                    key: key.to_string(),
                }
            } else {
                StorageError::PutObject(e.into_service_error().to_string())
            }
        })?;

        Ok(resp.e_tag().unwrap_or_default().to_string())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::DeleteObject(e.into_service_error().to_string()))?;

        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);

            if let Some(token) = &continuation_token {
                req = req.continuation_token(token);
            }

            let resp = req
                .send()
                .await
                .map_err(|e| StorageError::ListObjects(e.into_service_error().to_string()))?;

            for obj in resp.contents() {
                if let Some(key) = obj.key() {
                    keys.push(key.to_string());
                }
            }

            if resp.is_truncated() == Some(true) {
                continuation_token = resp.next_continuation_token().map(|s| s.to_string());
            } else {
                break;
            }
        }

        Ok(keys)
    }
}
