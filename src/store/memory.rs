//! In-process backend emulating S3 ListObjectsV2 semantics

use super::types::{ObjectListing, StoreError, StoreResult, StoredObject};
use super::ObjectStore;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

const DEFAULT_MAX_KEYS: usize = 1000;

/// A backend call recorded by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Put(String),
    Get(String),
    Delete(String),
    List {
        prefix: String,
        delimiter: Option<String>,
        token: Option<String>,
        max_keys: i32,
    },
    Presign(String),
}

struct StoredEntry {
    data: Vec<u8>,
    last_modified: DateTime<Utc>,
}

#[derive(Default)]
struct Faults {
    put_keys: HashSet<String>,
    delete_keys: HashSet<String>,
    list: bool,
    presign: bool,
}

/// Where a resumed listing starts: after a key, or after every key of a
/// common prefix.
enum Cursor {
    Key(String),
    Prefix(String),
}

impl Cursor {
    fn encode(&self) -> String {
        let raw = match self {
            Cursor::Key(key) => format!("k:{}", key),
            Cursor::Prefix(prefix) => format!("p:{}", prefix),
        };
        BASE64.encode(raw)
    }

    fn decode(token: &str) -> StoreResult<Self> {
        let invalid = || StoreError::request("list_objects_v2", "invalid continuation token");
        let raw = BASE64.decode(token).map_err(|_| invalid())?;
        let raw = String::from_utf8(raw).map_err(|_| invalid())?;
        if let Some(key) = raw.strip_prefix("k:") {
            Ok(Cursor::Key(key.to_string()))
        } else if let Some(prefix) = raw.strip_prefix("p:") {
            Ok(Cursor::Prefix(prefix.to_string()))
        } else {
            Err(invalid())
        }
    }

    fn is_past(&self, key: &str) -> bool {
        match self {
            Cursor::Key(last) => key > last.as_str(),
            Cursor::Prefix(prefix) => key > prefix.as_str() && !key.starts_with(prefix.as_str()),
        }
    }
}

enum Entry {
    Object(StoredObject),
    Prefix(String),
}

/// Ordered in-memory object store.
///
/// Used by the `memory` backend for local runs and by tests, which can
/// inspect the call journal and inject failures.
pub struct MemoryStore {
    bucket: String,
    objects: RwLock<BTreeMap<String, StoredEntry>>,
    calls: Mutex<Vec<StoreCall>>,
    faults: Mutex<Faults>,
    presign_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            faults: Mutex::new(Faults::default()),
            presign_seq: AtomicU64::new(0),
        }
    }

    /// Seed an object without recording a call.
    pub fn insert(&self, key: impl Into<String>, data: impl Into<Vec<u8>>) {
        let mut objects = self.objects.write().unwrap_or_else(|e| e.into_inner());
        objects.insert(
            key.into(),
            StoredEntry {
                data: data.into(),
                last_modified: Utc::now(),
            },
        );
    }

    /// All keys currently stored, in order.
    pub fn keys(&self) -> Vec<String> {
        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        objects.keys().cloned().collect()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Make every put of `key` fail.
    pub fn fail_put(&self, key: impl Into<String>) {
        let mut faults = self.faults.lock().unwrap_or_else(|e| e.into_inner());
        faults.put_keys.insert(key.into());
    }

    /// Make every delete of `key` fail.
    pub fn fail_delete(&self, key: impl Into<String>) {
        let mut faults = self.faults.lock().unwrap_or_else(|e| e.into_inner());
        faults.delete_keys.insert(key.into());
    }

    pub fn fail_list(&self, fail: bool) {
        self.faults.lock().unwrap_or_else(|e| e.into_inner()).list = fail;
    }

    pub fn fail_presign(&self, fail: bool) {
        self.faults.lock().unwrap_or_else(|e| e.into_inner()).presign = fail;
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, data: Vec<u8>) -> StoreResult<()> {
        self.record(StoreCall::Put(key.to_string()));
        if self
            .faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .put_keys
            .contains(key)
        {
            return Err(StoreError::Injected(format!("put of {} rejected", key)));
        }
        self.insert(key, data);
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.record(StoreCall::Get(key.to_string()));
        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        objects
            .get(key)
            .map(|entry| entry.data.clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.record(StoreCall::Delete(key.to_string()));
        if self
            .faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .delete_keys
            .contains(key)
        {
            return Err(StoreError::Injected(format!("delete of {} rejected", key)));
        }
        let mut objects = self.objects.write().unwrap_or_else(|e| e.into_inner());
        objects.remove(key);
        Ok(())
    }

    async fn list(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
        continuation_token: Option<&str>,
        max_keys: i32,
    ) -> StoreResult<ObjectListing> {
        self.record(StoreCall::List {
            prefix: prefix.to_string(),
            delimiter: delimiter.map(|d| d.to_string()),
            token: continuation_token.map(|t| t.to_string()),
            max_keys,
        });
        if self.faults.lock().unwrap_or_else(|e| e.into_inner()).list {
            return Err(StoreError::Injected("list rejected".to_string()));
        }

        let max_keys = if max_keys <= 0 {
            DEFAULT_MAX_KEYS
        } else {
            max_keys as usize
        };
        let delimiter = delimiter.filter(|d| !d.is_empty());
        let cursor = continuation_token.map(Cursor::decode).transpose()?;

        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        let mut entries: Vec<Entry> = Vec::new();
        let mut truncated = false;

        let candidates = objects
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix));

        for (key, stored) in candidates {
            if cursor.as_ref().is_some_and(|c| !c.is_past(key)) {
                continue;
            }

            let grouped = delimiter.and_then(|d| {
                key[prefix.len()..]
                    .find(d)
                    .map(|idx| key[..prefix.len() + idx + d.len()].to_string())
            });

            if let (Some(group), Some(Entry::Prefix(last))) = (&grouped, entries.last()) {
                if group == last {
                    continue;
                }
            }

            if entries.len() == max_keys {
                truncated = true;
                break;
            }

            entries.push(match grouped {
                Some(group) => Entry::Prefix(group),
                None => Entry::Object(StoredObject {
                    key: key.clone(),
                    size: stored.data.len() as i64,
                    last_modified: stored.last_modified,
                }),
            });
        }

        let next_token = if truncated {
            entries.last().map(|entry| match entry {
                Entry::Object(obj) => Cursor::Key(obj.key.clone()).encode(),
                Entry::Prefix(group) => Cursor::Prefix(group.clone()).encode(),
            })
        } else {
            None
        };

        let mut listing = ObjectListing {
            truncated,
            next_token,
            ..Default::default()
        };
        for entry in entries {
            match entry {
                Entry::Object(obj) => listing.objects.push(obj),
                Entry::Prefix(group) => listing.common_prefixes.push(group),
            }
        }

        Ok(listing)
    }

    async fn presign(&self, key: &str, ttl: Duration) -> StoreResult<String> {
        self.record(StoreCall::Presign(key.to_string()));
        if self.faults.lock().unwrap_or_else(|e| e.into_inner()).presign {
            return Err(StoreError::Presign {
                key: key.to_string(),
                message: "presign rejected".to_string(),
            });
        }
        let seq = self.presign_seq.fetch_add(1, Ordering::Relaxed);
        Ok(format!(
            "memory://{}/{}?expires_in={}&signature={}",
            self.bucket,
            key,
            ttl.as_secs(),
            seq
        ))
    }
}
