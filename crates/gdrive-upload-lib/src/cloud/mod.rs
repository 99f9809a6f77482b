pub mod body;
pub mod gdrive;
#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;

use crate::errors::Result;

pub use body::UploadBody;
pub use gdrive::GDriveClient;

/// Opaque identifier of a file in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteFileId(pub String);

impl RemoteFileId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RemoteFileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Exact-name lookup of non-trashed files directly under one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileQuery {
    pub name: String,
    pub folder_id: String,
}

impl FileQuery {
    pub fn new(name: &str, folder_id: &str) -> Self {
        Self {
            name: name.to_string(),
            folder_id: folder_id.to_string(),
        }
    }

    /// Render as a Drive `q` expression.
    pub fn to_drive_query(&self) -> String {
        format!(
            "name = '{}' and '{}' in parents and trashed = false",
            escape_literal(&self.name),
            escape_literal(&self.folder_id)
        )
    }
}

/// Escape a value for use inside a single-quoted Drive query literal.
pub fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// One page of listing results.
#[derive(Debug, Clone, Default)]
pub struct FilePage {
    pub ids: Vec<RemoteFileId>,
    pub next_page_token: Option<String>,
}

/// Metadata for a file about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub name: String,
    pub parent_id: String,
}

/// The three remote operations an upload run needs.
///
/// `GDriveClient` is the real implementation; tests run against an
/// in-memory store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch one page of files matching `query`.
    async fn list(&self, query: &FileQuery, page_token: Option<&str>) -> Result<FilePage>;

    /// Create a new file and stream `body` as its content.
    async fn create(&self, file: &NewFile, body: UploadBody) -> Result<RemoteFileId>;

    /// Replace the content of an existing file, keeping its identifier.
    async fn update(&self, id: &RemoteFileId, body: UploadBody) -> Result<RemoteFileId>;
}
