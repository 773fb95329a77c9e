//! Object and recursive folder deletion

use super::types::{FsError, FsResult};
use super::{normalize_folder, Explorer};
use log::{info, warn};

impl Explorer {
    /// Delete a single object. No recursion.
    pub async fn delete_object(&self, key: &str) -> FsResult<()> {
        if key.is_empty() {
            return Err(FsError::invalid("object path is required"));
        }
        self.store.delete(key).await?;
        info!("delete_object: {}", key);
        Ok(())
    }

    /// Delete every key below `folder_path`, then its marker.
    ///
    /// All pages are listed before the first delete. The first failed delete
    /// stops the run; keys already deleted stay deleted.
    pub async fn delete_folder(&self, folder_path: &str) -> FsResult<()> {
        if folder_path.is_empty() {
            return Err(FsError::invalid("folder path is required"));
        }
        let folder_path = normalize_folder(folder_path);

        let descendants = self.collect_descendants(&folder_path).await?;
        info!(
            "delete_folder: {} -> {} descendant keys",
            folder_path,
            descendants.len()
        );

        for (deleted, obj) in descendants.iter().enumerate() {
            if let Err(e) = self.store.delete(&obj.key).await {
                warn!(
                    "delete_folder: {} aborted after {} of {} deletes: {}",
                    folder_path,
                    deleted,
                    descendants.len(),
                    e
                );
                return Err(e.into());
            }
        }

        self.store.delete(&folder_path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::fs::{memory_explorer, FsError};
    use crate::store::StoreCall;

    #[tokio::test]
    async fn removes_every_key_under_prefix_and_the_marker() {
        let (store, explorer) = memory_explorer();
        for key in ["docs/", "docs/a.txt", "docs/sub/", "docs/sub/b.txt", "docs2/keep.txt"] {
            store.insert(key, b"x".to_vec());
        }

        explorer.delete_folder("docs").await.unwrap();

        assert_eq!(store.keys(), vec!["docs2/keep.txt".to_string()]);
        let calls = store.calls();
        assert_eq!(calls.last(), Some(&StoreCall::Delete("docs/".to_string())));
    }

    #[tokio::test]
    async fn lists_all_pages_before_deleting() {
        let (store, explorer) = memory_explorer();
        store.insert("docs/", Vec::new());
        for i in 0..1500 {
            store.insert(format!("docs/{:04}.bin", i), b"x".to_vec());
        }

        explorer.delete_folder("docs/").await.unwrap();

        let calls = store.calls();
        let first_delete = calls
            .iter()
            .position(|call| matches!(call, StoreCall::Delete(_)))
            .unwrap();
        let lists_before = calls[..first_delete]
            .iter()
            .filter(|call| matches!(call, StoreCall::List { .. }))
            .count();
        let deletes = calls
            .iter()
            .filter(|call| matches!(call, StoreCall::Delete(_)))
            .count();

        assert!(lists_before >= 2);
        assert_eq!(deletes, 1501);
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn deletes_in_listing_order_with_marker_last() {
        let (store, explorer) = memory_explorer();
        for key in ["a/", "a/1", "a/2/", "a/2/3"] {
            store.insert(key, b"x".to_vec());
        }

        explorer.delete_folder("a/").await.unwrap();

        let deletes: Vec<_> = store
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Delete(key) => Some(key),
                _ => None,
            })
            .collect();
        assert_eq!(deletes, vec!["a/1", "a/2/", "a/2/3", "a/"]);
    }

    #[tokio::test]
    async fn first_failure_aborts_without_rollback() {
        let (store, explorer) = memory_explorer();
        for key in ["a/", "a/1", "a/2", "a/3"] {
            store.insert(key, b"x".to_vec());
        }
        store.fail_delete("a/2");

        let result = explorer.delete_folder("a").await;

        assert!(matches!(result, Err(FsError::Store(_))));
        assert_eq!(
            store.keys(),
            vec!["a/".to_string(), "a/2".to_string(), "a/3".to_string()]
        );
    }

    #[tokio::test]
    async fn empty_folder_path_is_rejected() {
        let (store, explorer) = memory_explorer();
        store.insert("keep", b"x".to_vec());

        assert!(matches!(
            explorer.delete_folder("").await,
            Err(FsError::InvalidInput(_))
        ));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn delete_object_is_a_passthrough() {
        let (store, explorer) = memory_explorer();
        store.insert("docs/", Vec::new());
        store.insert("docs/a.txt", b"x".to_vec());

        explorer.delete_object("docs/").await.unwrap();

        assert_eq!(store.keys(), vec!["docs/a.txt".to_string()]);
        assert_eq!(store.calls(), vec![StoreCall::Delete("docs/".to_string())]);
    }
}
