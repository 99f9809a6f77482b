//! Shared HTTP client with connection pooling.
//!
//! Wraps `reqwest::Client`; clones are cheap and share one connection pool,
//! so the token exchange and the Drive calls reuse connections.

use std::time::Duration;

use crate::config::HttpSettings;
use crate::errors::{Result, UploadActionError};

#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// Build a new `HttpClient` configured from the given settings.
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout))
            .connect_timeout(Duration::from_secs(settings.connect_timeout))
            .pool_max_idle_per_host(settings.max_idle_conns_per_host)
            .pool_idle_timeout(Duration::from_secs(settings.idle_conn_timeout))
            .user_agent(concat!("gdrive-upload/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(UploadActionError::Http)?;
        Ok(Self { inner })
    }

    /// Build an `HttpClient` using `HttpSettings::default()`.
    pub fn from_defaults() -> Result<Self> {
        Self::new(&HttpSettings::default())
    }

    /// The underlying `reqwest::Client`.
    pub fn client(&self) -> &reqwest::Client {
        &self.inner
    }
}
