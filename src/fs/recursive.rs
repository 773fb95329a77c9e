//! Whole-subtree listing (all files, all folders)

use super::types::{FsResult, ListingPage, ObjectRecord};
use super::{normalize_folder, Explorer};
use crate::store::{StoredObject, DELIMITER};
use log::{debug, info};

/// Page size used for every folder visited by [`Explorer::list_all_files`].
pub const RECURSIVE_PAGE_SIZE: i32 = 100;

/// Keys per request for flat (non-delimited) prefix scans.
pub const FLAT_SCAN_PAGE_SIZE: i32 = 1000;

/// A folder marker is an empty object whose key ends with the delimiter.
fn is_folder_marker(obj: &StoredObject) -> bool {
    obj.size == 0 && obj.key.ends_with(DELIMITER)
}

impl Explorer {
    /// Every record below `folder_path`, at any depth, flattened.
    ///
    /// Folders are visited depth-first from an explicit stack. Every page of
    /// a folder is drained before any of its subfolders is visited.
    pub async fn list_all_files(&self, folder_path: &str) -> FsResult<ListingPage> {
        let root = normalize_folder(folder_path);
        let mut result = ListingPage {
            is_last_page: true,
            ..Default::default()
        };
        let mut pending = vec![root.clone()];
        let mut visited = 0usize;

        while let Some(folder) = pending.pop() {
            let records = self.drain_folder(&folder, &mut result).await?;
            visited += 1;

            let subfolders: Vec<String> = records
                .iter()
                .filter(|record| record.is_folder && record.name.ends_with(DELIMITER))
                .map(|record| record.name.clone())
                .collect();
            // Reversed so the first subfolder is popped first.
            pending.extend(subfolders.into_iter().rev());

            result.files.extend(records);
        }

        result.no_of_records_returned = result.files.len();
        info!(
            "list_all_files: {:?} -> {} records across {} folders",
            root, result.no_of_records_returned, visited
        );
        Ok(result)
    }

    /// All pages of one folder, in order. Counts are added to `totals`.
    async fn drain_folder(
        &self,
        folder: &str,
        totals: &mut ListingPage,
    ) -> FsResult<Vec<ObjectRecord>> {
        let mut records = Vec::new();
        let mut token = String::new();

        loop {
            let page = self
                .list_page(folder, &token, RECURSIVE_PAGE_SIZE, false)
                .await?;
            totals.files_count += page.files_count;
            totals.folders_count += page.folders_count;
            records.extend(page.files);

            if page.is_last_page || page.next_page_token.is_empty() {
                break;
            }
            token = page.next_page_token;
        }

        Ok(records)
    }

    /// Every folder marker below `folder_path`, found with one flat scan.
    ///
    /// Only empty objects whose key ends with the delimiter are folders;
    /// zero-byte files are left out.
    pub async fn list_all_folders(&self, folder_path: &str) -> FsResult<Vec<ObjectRecord>> {
        let folder_path = normalize_folder(folder_path);
        let folders: Vec<ObjectRecord> = self
            .collect_descendants(&folder_path)
            .await?
            .into_iter()
            .filter(is_folder_marker)
            .map(|obj| ObjectRecord::from_object(obj, None))
            .collect();

        debug!(
            "list_all_folders: {:?} -> {} folders",
            folder_path,
            folders.len()
        );
        Ok(folders)
    }

    /// Every object under `prefix` except the object named `prefix` itself,
    /// draining all pages of a flat listing.
    pub(crate) async fn collect_descendants(&self, prefix: &str) -> FsResult<Vec<StoredObject>> {
        let mut objects = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let listing = self
                .store
                .list(prefix, None, token.as_deref(), FLAT_SCAN_PAGE_SIZE)
                .await?;

            objects.extend(listing.objects.into_iter().filter(|obj| obj.key != prefix));

            match listing.next_token {
                Some(next) if listing.truncated => token = Some(next),
                _ => break,
            }
        }

        Ok(objects)
    }
}
