//! Google Drive client for the upload run.
//!
//! Implements the three `RemoteStore` operations against Drive API v3:
//! a filtered listing, and multipart create/update with the media part
//! streamed from the local file. Shared drives are supported on every call.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{future, stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::auth::TokenSource;
use crate::cloud::{FilePage, FileQuery, NewFile, RemoteFileId, RemoteStore, UploadBody};
use crate::errors::{Result, UploadActionError};
use crate::http_client::HttpClient;

// ---------------------------------------------------------------------------
// Data models
// ---------------------------------------------------------------------------

/// A file reference as returned with `fields=files(id)` or `fields=id,name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GDriveFileRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Response from the Google Drive files.list API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GDriveFileList {
    #[serde(default)]
    pub files: Vec<GDriveFileRef>,
    #[serde(rename = "nextPageToken", default)]
    pub next_page_token: Option<String>,
}

/// Metadata part of a multipart upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GDriveUploadMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
const LIST_PAGE_SIZE: &str = "100";

// ---------------------------------------------------------------------------
// GDriveClient
// ---------------------------------------------------------------------------

/// Google Drive client authenticated through a [`TokenSource`].
pub struct GDriveClient {
    http: HttpClient,
    tokens: Arc<dyn TokenSource>,
    api_base: String,
    upload_base: String,
}

impl GDriveClient {
    pub fn new(http: HttpClient, tokens: Arc<dyn TokenSource>) -> Self {
        Self::with_base_urls(http, tokens, DRIVE_API_BASE, DRIVE_UPLOAD_BASE)
    }

    /// Point the client at alternative API roots (used against mock servers).
    pub fn with_base_urls(
        http: HttpClient,
        tokens: Arc<dyn TokenSource>,
        api_base: &str,
        upload_base: &str,
    ) -> Self {
        Self {
            http,
            tokens,
            api_base: api_base.trim_end_matches('/').to_string(),
            upload_base: upload_base.trim_end_matches('/').to_string(),
        }
    }

    /// Send a multipart upload request and return the resulting file id.
    async fn send_upload(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
        metadata: &GDriveUploadMetadata,
        body: UploadBody,
    ) -> Result<RemoteFileId> {
        let token = self.tokens.access_token().await?;
        let boundary = multipart_boundary();
        let size = body.len();
        let body = multipart_related_body(metadata, body, &boundary)?;

        tracing::debug!(operation, size, "Streaming upload body");

        let resp = request
            .bearer_auth(&token)
            .query(&[
                ("uploadType", "multipart"),
                ("supportsAllDrives", "true"),
                ("fields", "id,name"),
            ])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| UploadActionError::Upload {
                operation: operation.to_string(),
                message: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(UploadActionError::upload(operation, status, &text));
        }

        let file: GDriveFileRef = resp.json().await.map_err(|e| UploadActionError::Upload {
            operation: operation.to_string(),
            message: format!("unexpected response: {e}"),
        })?;
        Ok(RemoteFileId(file.id))
    }
}

#[async_trait]
impl RemoteStore for GDriveClient {
    async fn list(&self, query: &FileQuery, page_token: Option<&str>) -> Result<FilePage> {
        let token = self.tokens.access_token().await?;
        let q = query.to_drive_query();
        tracing::debug!(q = %q, "Listing Drive files");

        let mut params: Vec<(&str, &str)> = vec![
            ("q", q.as_str()),
            ("fields", "nextPageToken,files(id)"),
            ("pageSize", LIST_PAGE_SIZE),
            ("supportsAllDrives", "true"),
            ("includeItemsFromAllDrives", "true"),
        ];
        if let Some(pt) = page_token {
            params.push(("pageToken", pt));
        }

        let resp = self
            .http
            .client()
            .get(format!("{}/files", self.api_base))
            .bearer_auth(&token)
            .query(&params)
            .send()
            .await
            .map_err(UploadActionError::Http)?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(UploadActionError::upload("list", status, &body));
        }

        let list: GDriveFileList = resp.json().await.map_err(UploadActionError::Http)?;
        Ok(FilePage {
            ids: list.files.into_iter().map(|f| RemoteFileId(f.id)).collect(),
            next_page_token: list.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn create(&self, file: &NewFile, body: UploadBody) -> Result<RemoteFileId> {
        let metadata = GDriveUploadMetadata {
            name: Some(file.name.clone()),
            parents: Some(vec![file.parent_id.clone()]),
        };
        let request = self
            .http
            .client()
            .post(format!("{}/files", self.upload_base));
        self.send_upload("create", request, &metadata, body).await
    }

    async fn update(&self, id: &RemoteFileId, body: UploadBody) -> Result<RemoteFileId> {
        let request = self
            .http
            .client()
            .patch(format!("{}/files/{}", self.upload_base, id));
        self.send_upload("update", request, &GDriveUploadMetadata::default(), body)
            .await
    }
}

// ---------------------------------------------------------------------------
// Multipart body
// ---------------------------------------------------------------------------

fn multipart_boundary() -> String {
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default();
    format!("gdrive_upload_{nanos:x}")
}

/// Build a `multipart/related` body: JSON metadata, then the file content
/// streamed chunk by chunk.
fn multipart_related_body(
    metadata: &GDriveUploadMetadata,
    body: UploadBody,
    boundary: &str,
) -> Result<reqwest::Body> {
    let metadata_json = serde_json::to_string(metadata).map_err(|e| UploadActionError::Upload {
        operation: "encode".into(),
        message: e.to_string(),
    })?;

    let head = format!(
        "--{boundary}\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\r\n\
         {metadata_json}\r\n\
         --{boundary}\r\n\
         Content-Type: {}\r\n\r\n",
        body.mime_type()
    );
    let tail = format!("\r\n--{boundary}--\r\n");

    let parts = stream::once(future::ready(Ok::<Bytes, std::io::Error>(Bytes::from(head))))
        .chain(body.into_stream())
        .chain(stream::once(future::ready(Ok(Bytes::from(tail)))));

    Ok(reqwest::Body::wrap_stream(parts))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
