//! Single-page directory listing

use super::types::{FsError, FsResult, ListingPage, ObjectRecord};
use super::{normalize_folder, Explorer};
use crate::store::DELIMITER;
use chrono::{SubsecRound, Utc};
use log::debug;

impl Explorer {
    /// List one page of the direct children of `folder_path`.
    ///
    /// Common prefixes become folder records. Unless `want_folders_only` is
    /// set, objects become records with a download link attached; the
    /// folder's own marker object is never returned. An empty
    /// `continuation_token` requests the first page.
    pub async fn list_page(
        &self,
        folder_path: &str,
        continuation_token: &str,
        page_size: i32,
        want_folders_only: bool,
    ) -> FsResult<ListingPage> {
        if page_size < 1 {
            return Err(FsError::invalid("page size must be at least 1"));
        }

        let folder_path = normalize_folder(folder_path);
        let token = Some(continuation_token).filter(|t| !t.is_empty());

        // One extra key leaves room for the folder's own marker.
        let listing = self
            .store
            .list(
                &folder_path,
                Some(DELIMITER),
                token,
                page_size.saturating_add(1),
            )
            .await?;

        let now = Utc::now().trunc_subsecs(0);
        let folders_count = listing.common_prefixes.len();
        let mut files: Vec<ObjectRecord> = listing
            .common_prefixes
            .into_iter()
            .map(|prefix| ObjectRecord::prefix_folder(prefix, now))
            .collect();

        let mut files_count = 0;
        if !want_folders_only {
            for obj in listing.objects {
                if obj.key == folder_path {
                    continue;
                }
                let link = self.resolve_link(&obj.key).await?;
                files.push(ObjectRecord::from_object(obj, Some(link)));
                files_count += 1;
            }
        }

        debug!(
            "list_page: {:?} files={} folders={} truncated={}",
            folder_path, files_count, folders_count, listing.truncated
        );

        Ok(ListingPage {
            no_of_records_returned: files.len(),
            files,
            next_page_token: listing.next_token.unwrap_or_default(),
            is_last_page: !listing.truncated,
            files_count,
            folders_count,
        })
    }
}
