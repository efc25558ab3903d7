//! Google Drive mirroring of the CSV log
//!
//! - `auth`: stored-credential lifecycle and the interactive authorization flow
//! - `drive`: Drive v3 REST client
//! - `uploader`: delete-then-upload replacement of the remote copy

pub mod auth;
pub mod drive;
pub mod uploader;


pub use auth::{AuthState, Authenticator, CredentialStore, StoredCredential};
pub use drive::{DriveClient, DriveConnector};
pub use uploader::{CloudUploader, UploadSummary};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// File entry as reported by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
}

/// Remote file operations used by the uploader
#[async_trait]
pub trait CloudStorage: Send + Sync {
    /// Files directly inside `folder` that are not in the trash
    async fn list_files(&self, folder: &str) -> Result<Vec<RemoteFile>>;

    async fn delete_file(&self, file_id: &str) -> Result<()>;

    /// Create an empty file entry named `name` inside `folder`
    async fn create_file(&self, name: &str, folder: &str) -> Result<RemoteFile>;

    /// Replace the content of an existing file entry
    async fn set_content(&self, file_id: &str, content: Vec<u8>, mime_type: &str) -> Result<()>;
}

/// Produces an authenticated storage handle
///
/// Connecting is deferred until after the row has been logged, so an
/// authentication failure never loses a measurement.
#[async_trait]
pub trait CloudConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn CloudStorage>>;
}
