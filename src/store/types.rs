//! Object store types and S3 client creation

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("{op} failed: {message}")]
    Request { op: &'static str, message: String },

    #[error("failed to presign {key}: {message}")]
    Presign { key: String, message: String },

    /// Failure injected by the memory backend.
    #[error("{0}")]
    Injected(String),
}

impl StoreError {
    pub(crate) fn request(op: &'static str, message: impl Into<String>) -> Self {
        StoreError::Request {
            op,
            message: message.into(),
        }
    }
}

/// One object as reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub size: i64,
    pub last_modified: DateTime<Utc>,
}

/// One page of a backend listing.
#[derive(Debug, Clone, Default)]
pub struct ObjectListing {
    pub objects: Vec<StoredObject>,
    pub common_prefixes: Vec<String>,
    pub next_token: Option<String>,
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub struct S3StoreConfig {
    pub bucket: String,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
}

/// Create an S3 client.
///
/// Static credentials are used when both keys are configured; otherwise the
/// default AWS provider chain (environment, profile, instance metadata).
pub async fn create_s3_client(config: &S3StoreConfig) -> Client {
    let mut builder = match (&config.access_key_id, &config.secret_access_key) {
        (Some(access_key_id), Some(secret_access_key)) => {
            let credentials = Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "bucketfs-static",
            );
            S3ConfigBuilder::new().credentials_provider(credentials)
        }
        _ => {
            let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
            S3ConfigBuilder::from(&sdk_config)
        }
    };

    builder = builder.region(Region::new(config.region.clone()));

    if let Some(endpoint_url) = &config.endpoint_url {
        builder = builder.endpoint_url(endpoint_url);
    }

    if config.force_path_style {
        builder = builder.force_path_style(true);
    }

    Client::from_conf(builder.build())
}
