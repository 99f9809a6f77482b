//! Service-account authentication for the Drive API.
//!
//! The credential input is decoded and its key parsed up front; access tokens
//! are fetched lazily on the first Drive call and cached until shortly before
//! they expire.

pub mod service_account;

use async_trait::async_trait;

use crate::errors::Result;

pub use service_account::{ServiceAccountAuthenticator, ServiceAccountKey};

/// Scope limited to files this application created or opened.
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

/// Something that can hand out a bearer token for Drive requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// A fixed token. Used by tests and for tokens minted outside this process.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
