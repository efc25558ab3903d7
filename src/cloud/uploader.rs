//! Replace the remote copy of the log with the local file

use super::{CloudStorage, RemoteFile};
use crate::error::{ErrorContext, Result};
use crate::logging::Logger;
use std::path::Path;

pub const CSV_MIME_TYPE: &str = "text/csv";

/// Result of a successful replacement
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSummary {
    pub file: RemoteFile,
    /// Previous copies removed before uploading
    pub deleted: usize,
}

pub struct CloudUploader<'a> {
    storage: &'a dyn CloudStorage,
    logger: &'a Logger,
}

impl<'a> CloudUploader<'a> {
    pub fn new(storage: &'a dyn CloudStorage, logger: &'a Logger) -> Self {
        Self { storage, logger }
    }

    /// Remove every file called `name` in `folder`.
    ///
    /// Best effort: listing or deletion failures are logged and skipped.
    pub async fn delete_existing(&self, name: &str, folder: &str) -> usize {
        let files = match self.storage.list_files(folder).await {
            Ok(files) => files,
            Err(e) => {
                self.logger
                    .warn("Could not list remote files, skipping removal of old copies")
                    .error_info(&e)
                    .log()
                    .await;
                return 0;
            }
        };

        let mut deleted = 0;
        for file in files.iter().filter(|f| f.name == name) {
            match self.storage.delete_file(&file.id).await {
                Ok(()) => {
                    deleted += 1;
                    self.logger
                        .debug("Deleted previous remote copy")
                        .field("file_id", &file.id)
                        .log()
                        .await;
                }
                Err(e) => {
                    self.logger
                        .warn("Could not delete previous remote copy")
                        .field("file_id", &file.id)
                        .error_info(&e)
                        .log()
                        .await;
                }
            }
        }
        deleted
    }

    /// Create `name` in `folder` holding the content of `local_path`
    pub async fn upload(&self, local_path: &Path, name: &str, folder: &str) -> Result<RemoteFile> {
        let content = tokio::fs::read(local_path)
            .await
            .with_context(|| format!("Failed to read {}", local_path.display()))?;

        let file = self.storage.create_file(name, folder).await?;
        self.storage
            .set_content(&file.id, content, CSV_MIME_TYPE)
            .await
            .with_context(|| format!("Failed to upload content of {}", name))?;

        Ok(file)
    }

    /// Delete old copies, then upload the current file
    pub async fn replace(&self, local_path: &Path, name: &str, folder: &str) -> Result<UploadSummary> {
        let deleted = self.delete_existing(name, folder).await;
        let file = self.upload(local_path, name, folder).await?;

        self.logger
            .info("Uploaded log")
            .field("file_id", &file.id)
            .field("name", &file.name)
            .field("deleted", deleted)
            .log()
            .await;

        Ok(UploadSummary { file, deleted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::testing::MemoryStorage;
    use tempfile::TempDir;

    const NAME: &str = "internet_speedtest.csv";

    fn local_log(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(NAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_replace_leaves_exactly_one_copy() {
        let dir = TempDir::new().unwrap();
        let path = local_log(&dir, "header\nrow1\nrow2\n");
        let storage = MemoryStorage::default()
            .with_file(NAME, "root", b"header\nrow1\n")
            .with_file("other.txt", "root", b"keep me");
        let logger = Logger::quiet("UPLOAD");

        let summary = CloudUploader::new(&storage, &logger)
            .replace(&path, NAME, "root")
            .await
            .unwrap();

        assert_eq!(summary.deleted, 1);
        let copies = storage.files_named(NAME);
        assert_eq!(copies.len(), 1);
        assert_eq!(copies[0].content, b"header\nrow1\nrow2\n");
        assert_eq!(copies[0].folder, "root");
        assert_eq!(storage.files_named("other.txt").len(), 1);
    }

    #[tokio::test]
    async fn test_duplicates_are_all_removed() {
        let dir = TempDir::new().unwrap();
        let path = local_log(&dir, "new");
        let storage = MemoryStorage::default()
            .with_file(NAME, "root", b"a")
            .with_file(NAME, "root", b"b");
        let logger = Logger::quiet("UPLOAD");

        let summary = CloudUploader::new(&storage, &logger)
            .replace(&path, NAME, "root")
            .await
            .unwrap();

        assert_eq!(summary.deleted, 2);
        assert_eq!(storage.files_named(NAME).len(), 1);
    }

    #[tokio::test]
    async fn test_same_name_in_other_folder_is_untouched() {
        let dir = TempDir::new().unwrap();
        let path = local_log(&dir, "new");
        let storage = MemoryStorage::default().with_file(NAME, "archive", b"old");
        let logger = Logger::quiet("UPLOAD");

        let summary = CloudUploader::new(&storage, &logger)
            .replace(&path, NAME, "root")
            .await
            .unwrap();

        assert_eq!(summary.deleted, 0);
        assert_eq!(storage.files_named(NAME).len(), 2);
    }

    #[tokio::test]
    async fn test_delete_failure_still_uploads() {
        let dir = TempDir::new().unwrap();
        let path = local_log(&dir, "new");
        let storage = MemoryStorage {
            fail_delete: true,
            ..MemoryStorage::default()
        }
        .with_file(NAME, "root", b"old");
        let logger = Logger::quiet("UPLOAD");

        let summary = CloudUploader::new(&storage, &logger)
            .replace(&path, NAME, "root")
            .await
            .unwrap();

        assert_eq!(summary.deleted, 0);
        assert_eq!(storage.files_named(NAME).len(), 2);
    }

    #[tokio::test]
    async fn test_list_failure_still_uploads() {
        let dir = TempDir::new().unwrap();
        let path = local_log(&dir, "new");
        let storage = MemoryStorage {
            fail_list: true,
            ..MemoryStorage::default()
        };
        let logger = Logger::quiet("UPLOAD");

        let summary = CloudUploader::new(&storage, &logger)
            .replace(&path, NAME, "root")
            .await
            .unwrap();

        assert_eq!(summary.deleted, 0);
        assert_eq!(storage.files_named(NAME).len(), 1);
    }

    #[tokio::test]
    async fn test_upload_failure_propagates() {
        let dir = TempDir::new().unwrap();
        let path = local_log(&dir, "new");
        let storage = MemoryStorage {
            fail_create: true,
            ..MemoryStorage::default()
        };
        let logger = Logger::quiet("UPLOAD");

        let error = CloudUploader::new(&storage, &logger)
            .replace(&path, NAME, "root")
            .await
            .unwrap_err();

        assert_eq!(error.category(), "CLOUD");
    }

    #[tokio::test]
    async fn test_missing_local_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let storage = MemoryStorage::default();
        let logger = Logger::quiet("UPLOAD");

        let error = CloudUploader::new(&storage, &logger)
            .upload(&dir.path().join("absent.csv"), NAME, "root")
            .await
            .unwrap_err();

        assert_eq!(error.category(), "IO");
        assert!(storage.files_named(NAME).is_empty());
    }
}
