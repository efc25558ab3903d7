//! Google Drive v3 REST client

use super::auth::Authenticator;
use super::{CloudConnector, CloudStorage, RemoteFile};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Drive client bound to one access token
#[derive(Debug, Clone)]
pub struct DriveClient {
    client: Client,
    api_base: String,
    access_token: String,
}

impl DriveClient {
    pub fn new(api_base: &str, access_token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(format!("speedtest-logger/{}", crate::VERSION))
            .build()
            .map_err(|e| AppError::http_request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.api_base)
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = format!("Drive {} failed with {}: {}", action, status, api_error_message(&body));
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::auth(message),
            _ => AppError::cloud_storage(message),
        })
    }
}

/// Pull `error.message` out of a Drive error body, falling back to the raw text
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl CloudStorage for DriveClient {
    async fn list_files(&self, folder: &str) -> Result<Vec<RemoteFile>> {
        let query = format!("'{}' in parents and trashed=false", folder);
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("q", query.as_str()),
                ("fields", "nextPageToken, files(id, name)"),
                ("pageSize", "1000"),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let response = self
                .send(self.client.get(self.files_url()).query(&params), "file listing")
                .await?;
            let page: FileList = response
                .json()
                .await
                .map_err(|e| AppError::cloud_storage(format!("Unexpected file listing response: {}", e)))?;

            files.extend(page.files);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(files)
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        let url = format!("{}/{}", self.files_url(), file_id);
        self.send(self.client.delete(url), "delete").await?;
        Ok(())
    }

    async fn create_file(&self, name: &str, folder: &str) -> Result<RemoteFile> {
        let metadata = json!({
            "name": name,
            "parents": [folder],
            "mimeType": "text/csv",
        });

        let response = self
            .send(
                self.client
                    .post(self.files_url())
                    .query(&[("fields", "id, name")])
                    .json(&metadata),
                "file creation",
            )
            .await?;

        response
            .json()
            .await
            .map_err(|e| AppError::cloud_storage(format!("Unexpected file creation response: {}", e)))
    }

    async fn set_content(&self, file_id: &str, content: Vec<u8>, mime_type: &str) -> Result<()> {
        let url = format!("{}/upload/drive/v3/files/{}", self.api_base, file_id);
        self.send(
            self.client
                .patch(url)
                .query(&[("uploadType", "media")])
                .header(reqwest::header::CONTENT_TYPE, mime_type)
                .body(content),
            "upload",
        )
        .await?;
        Ok(())
    }
}

/// Authenticates, then hands out a `DriveClient`
pub struct DriveConnector {
    authenticator: Authenticator,
    api_base: String,
}

impl DriveConnector {
    pub fn new(authenticator: Authenticator, api_base: impl Into<String>) -> Self {
        Self {
            authenticator,
            api_base: api_base.into(),
        }
    }
}

#[async_trait]
impl CloudConnector for DriveConnector {
    async fn connect(&self) -> Result<Box<dyn CloudStorage>> {
        let credential = self.authenticator.authenticate().await?;
        Ok(Box::new(DriveClient::new(&self.api_base, credential.access_token)?))
    }
}
