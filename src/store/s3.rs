//! S3 backend (list, put, get, delete, presign)

use super::types::{
    create_s3_client, ObjectListing, S3StoreConfig, StoreError, StoreResult, StoredObject,
};
use super::ObjectStore;
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use log::debug;
use std::time::Duration;

/// Object store backed by one S3 bucket.
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub async fn connect(config: &S3StoreConfig) -> Self {
        let client = create_s3_client(config).await;
        Self {
            client,
            bucket: config.bucket.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn to_utc(dt: Option<&aws_sdk_s3::primitives::DateTime>) -> DateTime<Utc> {
    dt.and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
        .unwrap_or_default()
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, data: Vec<u8>) -> StoreResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StoreError::request("put_object", DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StoreError::NotFound(key.to_string())
                } else {
                    StoreError::request("get_object", DisplayErrorContext(&e).to_string())
                }
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| StoreError::request("get_object", e.to_string()))?;

        Ok(body.into_bytes().to_vec())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                StoreError::request("delete_object", DisplayErrorContext(&e).to_string())
            })?;
        Ok(())
    }

    async fn list(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
        continuation_token: Option<&str>,
        max_keys: i32,
    ) -> StoreResult<ObjectListing> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .max_keys(max_keys);

        if let Some(d) = delimiter {
            request = request.delimiter(d);
        }
        if let Some(token) = continuation_token {
            request = request.continuation_token(token);
        }

        let response = request.send().await.map_err(|e| {
            StoreError::request("list_objects_v2", DisplayErrorContext(&e).to_string())
        })?;

        // Directory markers are kept; callers decide how to present them.
        let objects = response
            .contents()
            .iter()
            .filter_map(|obj| {
                Some(StoredObject {
                    key: obj.key()?.to_string(),
                    size: obj.size().unwrap_or(0),
                    last_modified: to_utc(obj.last_modified()),
                })
            })
            .collect::<Vec<_>>();

        let common_prefixes = response
            .common_prefixes()
            .iter()
            .filter_map(|prefix| prefix.prefix().map(|s| s.to_string()))
            .collect::<Vec<_>>();

        debug!(
            "list_objects_v2: prefix={:?} objects={} prefixes={} truncated={:?}",
            prefix,
            objects.len(),
            common_prefixes.len(),
            response.is_truncated()
        );

        Ok(ObjectListing {
            objects,
            common_prefixes,
            truncated: response.is_truncated().unwrap_or(false),
            next_token: response.next_continuation_token().map(|s| s.to_string()),
        })
    }

    async fn presign(&self, key: &str, ttl: Duration) -> StoreResult<String> {
        let presigning_config = PresigningConfig::expires_in(ttl).map_err(|e| StoreError::Presign {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| StoreError::Presign {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(presigned_request.uri().to_string())
    }
}
