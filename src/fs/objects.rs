//! Folder creation, uploads and download links

use super::types::{DownloadLink, FsError, FsResult, UploadedFile};
use super::{basename, normalize_folder, Explorer};
use crate::store::DELIMITER;
use log::info;

impl Explorer {
    /// Create an empty marker object for `folder_path`.
    pub async fn create_folder(&self, folder_path: &str) -> FsResult<String> {
        if folder_path.is_empty() {
            return Err(FsError::invalid(
                "folder path is required and should end with /",
            ));
        }
        let folder_path = normalize_folder(folder_path);
        self.store.put(&folder_path, Vec::new()).await?;
        info!("create_folder: {}", folder_path);
        Ok(folder_path)
    }

    /// Upload one file into `folder_path` (the root when absent or empty).
    /// Returns the object key.
    pub async fn upload_file(
        &self,
        folder_path: Option<&str>,
        file: UploadedFile,
    ) -> FsResult<String> {
        if file.name.is_empty() {
            return Err(FsError::invalid("file name is required"));
        }

        let key = match folder_path.filter(|p| !p.is_empty()) {
            Some(folder) if folder.ends_with(DELIMITER) => format!("{}{}", folder, file.name),
            Some(folder) => format!("{}{}{}", folder, DELIMITER, file.name),
            None => file.name,
        };

        let size = file.data.len();
        self.store.put(&key, file.data).await?;
        info!("upload_file: {} ({} bytes)", key, size);
        Ok(key)
    }

    /// Upload files one by one, each keyed by its own name.
    ///
    /// Stops at the first failure; files uploaded before it are kept.
    pub async fn upload_files(&self, files: Vec<UploadedFile>) -> FsResult<usize> {
        if let Some(unnamed) = files.iter().position(|f| f.name.is_empty()) {
            return Err(FsError::invalid(format!("file {} has no name", unnamed)));
        }

        let total = files.len();
        for file in files {
            self.store.put(&file.name, file.data).await?;
        }
        info!("upload_files: {} files", total);
        Ok(total)
    }

    /// Presigned URL for `key` and the key's base name.
    pub async fn download_link(&self, key: &str) -> FsResult<DownloadLink> {
        let file_name = basename(key);
        if file_name.is_empty() {
            return Err(FsError::invalid("file path is required"));
        }
        let url = self.resolve_link(key).await?;
        Ok(DownloadLink {
            url,
            file_name: file_name.to_string(),
        })
    }

    /// Full content of `key`.
    pub async fn read_object(&self, key: &str) -> FsResult<Vec<u8>> {
        if key.is_empty() {
            return Err(FsError::invalid("object path is required"));
        }
        Ok(self.store.get(key).await?)
    }
}

#[cfg(test)]
mod tests {
    use crate::fs::{memory_explorer, FsError, UploadedFile};
    use crate::store::{StoreCall, StoreError};

    fn file(name: &str, data: &[u8]) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            data: data.to_vec(),
        }
    }

    #[tokio::test]
    async fn create_folder_writes_empty_marker() {
        let (store, explorer) = memory_explorer();

        let key = explorer.create_folder("reports/2024").await.unwrap();

        assert_eq!(key, "reports/2024/");
        assert_eq!(store.keys(), vec!["reports/2024/".to_string()]);
        assert!(explorer.read_object(&key).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_folder_requires_a_path() {
        let (store, explorer) = memory_explorer();
        assert!(matches!(
            explorer.create_folder("").await,
            Err(FsError::InvalidInput(_))
        ));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn upload_joins_folder_and_name() {
        let (store, explorer) = memory_explorer();

        let nested = explorer
            .upload_file(Some("docs"), file("a.txt", b"hi"))
            .await
            .unwrap();
        let slashed = explorer
            .upload_file(Some("docs/"), file("b.txt", b"hi"))
            .await
            .unwrap();
        let root = explorer.upload_file(None, file("c.txt", b"hi")).await.unwrap();

        assert_eq!(nested, "docs/a.txt");
        assert_eq!(slashed, "docs/b.txt");
        assert_eq!(root, "c.txt");
        assert_eq!(store.keys().len(), 3);
    }

    #[tokio::test]
    async fn upload_files_keys_by_file_name() {
        let (store, explorer) = memory_explorer();

        let count = explorer
            .upload_files(vec![file("one.txt", b"1"), file("two.txt", b"22")])
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Put("one.txt".to_string()),
                StoreCall::Put("two.txt".to_string())
            ]
        );
        assert_eq!(explorer.read_object("two.txt").await.unwrap(), b"22".to_vec());
    }

    #[tokio::test]
    async fn upload_files_stops_at_first_failure() {
        let (store, explorer) = memory_explorer();
        store.fail_put("b");

        let result = explorer
            .upload_files(vec![file("a", b"1"), file("b", b"2"), file("c", b"3")])
            .await;

        assert!(matches!(result, Err(FsError::Store(StoreError::Injected(_)))));
        assert_eq!(store.keys(), vec!["a".to_string()]);
        assert!(!store.calls().contains(&StoreCall::Put("c".to_string())));
    }

    #[tokio::test]
    async fn download_link_returns_base_name_and_caches_url() {
        let (store, explorer) = memory_explorer();
        store.insert("docs/report.pdf", b"%PDF".to_vec());

        let first = explorer.download_link("docs/report.pdf").await.unwrap();
        let second = explorer.download_link("docs/report.pdf").await.unwrap();

        assert_eq!(first.file_name, "report.pdf");
        assert_eq!(first, second);
        assert_eq!(explorer.links().len(), 1);
    }

    #[tokio::test]
    async fn read_missing_object_surfaces_not_found() {
        let (_store, explorer) = memory_explorer();
        assert!(matches!(
            explorer.read_object("nope").await,
            Err(FsError::Store(StoreError::NotFound(_)))
        ));
    }
}
