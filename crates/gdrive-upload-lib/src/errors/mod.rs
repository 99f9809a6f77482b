use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadActionError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Credential format error: {0}")]
    CredentialFormat(String),

    #[error("Found {count} files named '{name}' in folder {folder_id}; refusing to pick one")]
    AmbiguousName {
        name: String,
        folder_id: String,
        count: usize,
    },

    #[error("File '{name}' already exists in the destination folder and overwrite is disabled")]
    FileExists { name: String },

    #[error("Upload error ({operation}): {message}")]
    Upload { operation: String, message: String },

    #[error("Cannot read local file {}: {source}", .path.display())]
    LocalRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, UploadActionError>;

impl UploadActionError {
    /// Build an `Upload` error from a non-success Drive response.
    pub fn upload(operation: &str, status: u16, body: &str) -> Self {
        UploadActionError::Upload {
            operation: operation.to_string(),
            message: format!("request failed ({status}): {body}"),
        }
    }

    pub fn local_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UploadActionError::LocalRead {
            path: path.into(),
            source,
        }
    }
}

/// Reports the run's terminal failure to the runner.
///
/// The error's `Display` output is the visible failure reason: it is logged
/// through `tracing` and emitted as an `::error::` annotation.
pub fn report_failure(err: &UploadActionError) {
    tracing::error!("Upload run failed: {}", err);
    crate::output::error(&err.to_string());
}

/// Reports the failure and exits the process with code 1.
pub fn handle_fatal(err: UploadActionError) -> ! {
    report_failure(&err);
    std::process::exit(1)
}
