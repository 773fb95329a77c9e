//! Virtual filesystem over a flat object store
//!
//! This module is organized into submodules:
//! - `types`: Records, listing pages and errors
//! - `listing`: Single-page directory listing
//! - `recursive`: Whole-subtree file and folder listing
//! - `delete`: Object and recursive folder deletion
//! - `objects`: Folder creation, uploads and download links

mod delete;
mod listing;
mod objects;
mod recursive;
mod types;

use crate::cache::LinkCache;
use crate::store::{ObjectStore, DELIMITER};
use std::sync::Arc;
use std::time::Duration;

pub use recursive::{FLAT_SCAN_PAGE_SIZE, RECURSIVE_PAGE_SIZE};
pub use types::{DownloadLink, FsError, FsResult, ListingPage, ObjectRecord, UploadedFile};

/// Entry point for every file and folder operation.
///
/// Built once at startup and shared between requests.
pub struct Explorer {
    store: Arc<dyn ObjectStore>,
    links: Arc<LinkCache>,
    link_ttl: Duration,
}

impl Explorer {
    pub fn new(store: Arc<dyn ObjectStore>, links: Arc<LinkCache>, link_ttl: Duration) -> Self {
        Self {
            store,
            links,
            link_ttl,
        }
    }

    pub fn links(&self) -> &Arc<LinkCache> {
        &self.links
    }

    /// Presigned download URL for `key`, served from the link cache when
    /// still valid.
    async fn resolve_link(&self, key: &str) -> FsResult<String> {
        let store = &self.store;
        let ttl = self.link_ttl;
        let url = self
            .links
            .get_or_create(key, ttl, || async move { store.presign(key, ttl).await })
            .await?;
        Ok(url)
    }
}

/// Folder paths always end with the delimiter, except the root ("").
pub(crate) fn normalize_folder(path: &str) -> String {
    if path.is_empty() || path.ends_with(DELIMITER) {
        path.to_string()
    } else {
        format!("{}{}", path, DELIMITER)
    }
}

/// Last path segment of `key`, ignoring trailing delimiters.
pub(crate) fn basename(key: &str) -> &str {
    key.trim_end_matches(DELIMITER)
        .rsplit(DELIMITER)
        .next()
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) fn memory_explorer() -> (Arc<crate::store::MemoryStore>, Explorer) {
    let store = Arc::new(crate::store::MemoryStore::new("test-bucket"));
    let explorer = Explorer::new(
        store.clone(),
        Arc::new(LinkCache::new(1024)),
        Duration::from_secs(900),
    );
    (store, explorer)
}
