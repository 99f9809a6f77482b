//! Local file content handed to the remote store.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures_util::Stream;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;

use crate::errors::{Result, UploadActionError};

/// An open local file, read once as the body of a create or update.
///
/// The handle is owned by this value and closed when it (or the stream made
/// from it) is dropped, whether the transfer succeeded or not.
#[derive(Debug)]
pub struct UploadBody {
    path: PathBuf,
    file: tokio::fs::File,
    len: u64,
    mime_type: String,
}

impl UploadBody {
    /// Open `path` for upload. Missing, unreadable or non-regular paths fail
    /// with `LocalRead`.
    pub async fn open(path: &Path) -> Result<Self> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| UploadActionError::local_read(path, e))?;
        let meta = file
            .metadata()
            .await
            .map_err(|e| UploadActionError::local_read(path, e))?;

        if !meta.is_file() {
            return Err(UploadActionError::local_read(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }

        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            len: meta.len(),
            mime_type,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Consume into a chunked byte stream.
    pub fn into_stream(self) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
        ReaderStream::new(self.file)
    }

    /// Read the whole file into memory.
    pub async fn read_to_end(mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.len as usize);
        self.file
            .read_to_end(&mut buf)
            .await
            .map_err(|e| UploadActionError::local_read(&self.path, e))?;
        Ok(buf)
    }
}
