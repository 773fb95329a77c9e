//! Object store module - flat key-addressed storage backends
//!
//! This module is organized into submodules:
//! - `types`: Core types, errors and S3 client creation
//! - `s3`: Amazon S3 / S3-compatible backend
//! - `memory`: In-process backend emulating S3 listing semantics

mod memory;
mod s3;
mod types;

use async_trait::async_trait;
use std::time::Duration;

// Re-export types
pub use types::{ObjectListing, S3StoreConfig, StoreError, StoreResult, StoredObject};

// Re-export backends
pub use memory::{MemoryStore, StoreCall};
pub use s3::S3Store;

/// Delimiter used to group keys into virtual folders.
pub const DELIMITER: &str = "/";

/// Uniform interface over a flat key-addressed object store.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Write `data` under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: Vec<u8>) -> StoreResult<()>;

    /// Read the full content of `key`.
    async fn get(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Delete `key`. Deleting a key that does not exist succeeds.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// List one page of keys under `prefix`.
    ///
    /// With a delimiter, keys containing the delimiter after the prefix are
    /// grouped into common prefixes. Each object and each common prefix counts
    /// toward `max_keys`.
    async fn list(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
        continuation_token: Option<&str>,
        max_keys: i32,
    ) -> StoreResult<ObjectListing>;

    /// Generate a time-limited GET URL for `key`.
    async fn presign(&self, key: &str, ttl: Duration) -> StoreResult<String>;
}
