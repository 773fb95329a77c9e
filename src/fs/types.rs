//! Directory entry and listing page types

use crate::store::{StoreError, StoredObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type FsResult<T> = Result<T, FsError>;

#[derive(Debug, Error)]
pub enum FsError {
    /// Rejected before any backend call.
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FsError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        FsError::InvalidInput(message.into())
    }
}

/// One directory entry: a file, a folder marker or a common-prefix folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    pub name: String,
    pub is_folder: bool,
    pub size: i64,
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_link: Option<String>,
}

impl ObjectRecord {
    /// Folder synthesized from a common prefix. The backend reports no
    /// timestamp for prefixes, so the caller passes "now".
    pub(crate) fn prefix_folder(prefix: String, now: DateTime<Utc>) -> Self {
        ObjectRecord {
            name: prefix,
            is_folder: true,
            size: 0,
            last_modified: now,
            download_link: None,
        }
    }

    /// Record for a listed object; zero-size objects count as folders.
    pub(crate) fn from_object(obj: StoredObject, download_link: Option<String>) -> Self {
        ObjectRecord {
            is_folder: obj.size == 0,
            name: obj.key,
            size: obj.size,
            last_modified: obj.last_modified,
            download_link,
        }
    }
}

/// Result of one bounded listing call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    pub files: Vec<ObjectRecord>,
    pub next_page_token: String,
    pub is_last_page: bool,
    pub no_of_records_returned: usize,
    pub files_count: usize,
    pub folders_count: usize,
}

/// A presigned URL together with the object's base name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    pub url: String,
    pub file_name: String,
}

/// One file received for upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub data: Vec<u8>,
}
