//! Client for the Drive-style remote file store.
//!
//! Four operations against a bearer-token-authenticated REST surface:
//! list, download, create, update. No retries; non-success responses map
//! to [`RemoteError`]. Requests inherit the transport-level timeout, which
//! the remote side of the sync design leaves unbounded.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::RemoteError;
use crate::types::FileMeta;

/// MIME type the recipe file is stored and listed under.
pub const JSON_MIME: &str = "application/json";

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// Remote file store operations, parameterized by bearer token.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List files of the known content type.
    async fn list(&self, token: &str) -> Result<Vec<FileMeta>, RemoteError>;

    /// Return the raw content of one file.
    async fn download(&self, token: &str, file_id: &str) -> Result<String, RemoteError>;

    /// Create a file. Two-phase: a metadata record first, then a follow-up
    /// content upload. There is no atomicity between the phases; a failed
    /// second phase leaves an empty metadata record behind.
    async fn create(&self, token: &str, name: &str, content: &str) -> Result<(), RemoteError>;

    /// Overwrite the content of an existing file in place.
    async fn update(&self, token: &str, file_id: &str, content: &str) -> Result<(), RemoteError>;
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileMeta>,
}

#[derive(Deserialize)]
struct CreatedFile {
    id: String,
}

/// Production client for the Drive v3 REST surface.
pub struct DriveClient {
    inner: reqwest::Client,
    api_base: String,
    upload_base: String,
}

impl DriveClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point both the metadata and upload endpoints at a different host.
    /// Intended for tests and self-hosted Drive-compatible stores.
    pub fn with_base_url(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            inner: reqwest::Client::new(),
            upload_base: base.clone(),
            api_base: base,
        }
    }
}

impl Default for DriveClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a non-success response to `RemoteError::Status`, keeping the body
/// for the human-readable sync status line.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RemoteStore for DriveClient {
    async fn list(&self, token: &str) -> Result<Vec<FileMeta>, RemoteError> {
        let url = format!("{}/drive/v3/files", self.api_base);
        tracing::debug!(%url, "listing remote files");

        let response = self
            .inner
            .get(&url)
            .query(&[("q", format!("mimeType='{JSON_MIME}'"))])
            .bearer_auth(token)
            .send()
            .await?;
        let body = check(response).await?.text().await?;

        let listing: FileList = serde_json::from_str(&body)
            .map_err(|e| RemoteError::MalformedListing(e.to_string()))?;
        Ok(listing.files)
    }

    async fn download(&self, token: &str, file_id: &str) -> Result<String, RemoteError> {
        let url = format!("{}/drive/v3/files/{}", self.api_base, file_id);
        tracing::debug!(%url, "downloading remote file");

        let response = self
            .inner
            .get(&url)
            .query(&[("alt", "media")])
            .bearer_auth(token)
            .send()
            .await?;
        Ok(check(response).await?.text().await?)
    }

    async fn create(&self, token: &str, name: &str, content: &str) -> Result<(), RemoteError> {
        // Phase 1: metadata record
        let url = format!("{}/drive/v3/files", self.api_base);
        tracing::debug!(%url, name, "creating remote file");

        let response = self
            .inner
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "name": name, "mimeType": JSON_MIME }))
            .send()
            .await?;
        let body = check(response).await?.text().await?;
        let created: CreatedFile = serde_json::from_str(&body)
            .map_err(|e| RemoteError::MalformedListing(e.to_string()))?;

        // Phase 2: content upload. If this fails, the metadata record from
        // phase 1 stays behind; there is no compensating rollback.
        self.update(token, &created.id, content).await
    }

    async fn update(&self, token: &str, file_id: &str, content: &str) -> Result<(), RemoteError> {
        let url = format!("{}/upload/drive/v3/files/{}", self.upload_base, file_id);
        tracing::debug!(%url, "uploading file content");

        let response = self
            .inner
            .patch(&url)
            .query(&[("uploadType", "media")])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json; charset=UTF-8")
            .body(content.to_string())
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[derive(Default)]
struct MockRemoteState {
    files: Vec<(FileMeta, String)>,
    next_id: u64,
    broken_downloads: HashSet<String>,
}

/// In-memory remote store for tests.
#[derive(Default)]
pub struct MockRemoteStore {
    state: Mutex<MockRemoteState>,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file with the given name and content.
    pub fn with_file(self, name: &str, content: &str) -> Self {
        {
            let mut state = self.state.lock().expect("mock state poisoned");
            state.next_id += 1;
            let id = format!("f{}", state.next_id);
            state
                .files
                .push((FileMeta { id, name: name.to_string() }, content.to_string()));
        }
        self
    }

    /// Make every download of the named file fail with a server error.
    pub fn with_broken_download(self, name: &str) -> Self {
        {
            let mut state = self.state.lock().expect("mock state poisoned");
            let id = state
                .files
                .iter()
                .find(|(meta, _)| meta.name == name)
                .map(|(meta, _)| meta.id.clone());
            if let Some(id) = id {
                state.broken_downloads.insert(id);
            }
        }
        self
    }

    /// Content of the named file, if present. Assertion helper.
    pub fn file_content(&self, name: &str) -> Option<String> {
        let state = self.state.lock().expect("mock state poisoned");
        state
            .files
            .iter()
            .find(|(meta, _)| meta.name == name)
            .map(|(_, content)| content.clone())
    }

    /// Number of files currently held. Assertion helper.
    pub fn file_count(&self) -> usize {
        self.state.lock().expect("mock state poisoned").files.len()
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn list(&self, _token: &str) -> Result<Vec<FileMeta>, RemoteError> {
        let state = self.state.lock().expect("mock state poisoned");
        Ok(state.files.iter().map(|(meta, _)| meta.clone()).collect())
    }

    async fn download(&self, _token: &str, file_id: &str) -> Result<String, RemoteError> {
        let state = self.state.lock().expect("mock state poisoned");
        if state.broken_downloads.contains(file_id) {
            return Err(RemoteError::Status {
                status: 500,
                body: "mock download failure".to_string(),
            });
        }
        state
            .files
            .iter()
            .find(|(meta, _)| meta.id == file_id)
            .map(|(_, content)| content.clone())
            .ok_or(RemoteError::Status {
                status: 404,
                body: "no such file".to_string(),
            })
    }

    async fn create(&self, _token: &str, name: &str, content: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.next_id += 1;
        let id = format!("f{}", state.next_id);
        state
            .files
            .push((FileMeta { id, name: name.to_string() }, content.to_string()));
        Ok(())
    }

    async fn update(&self, _token: &str, file_id: &str, content: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().expect("mock state poisoned");
        match state.files.iter_mut().find(|(meta, _)| meta.id == file_id) {
            Some((_, existing)) => {
                *existing = content.to_string();
                Ok(())
            }
            None => Err(RemoteError::Status {
                status: 404,
                body: "no such file".to_string(),
            }),
        }
    }
}
