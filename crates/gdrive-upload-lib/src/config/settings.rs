use crate::errors::{Result, UploadActionError};

pub const ENV_TIMEOUT_SECS: &str = "GDRIVE_UPLOAD_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "GDRIVE_UPLOAD_CONNECT_TIMEOUT_SECS";

/// Transport settings for the shared HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    /// Whole-request timeout in seconds. Covers the full upload body.
    pub timeout: u64,
    pub connect_timeout: u64,
    pub idle_conn_timeout: u64,
    pub max_idle_conns_per_host: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: 600,
            connect_timeout: 10,
            idle_conn_timeout: 90,
            max_idle_conns_per_host: 4,
        }
    }
}

impl HttpSettings {
    /// Defaults, with timeouts overridable through environment variables.
    pub fn from_env() -> Result<Self> {
        Self::resolve(|name| std::env::var(name).ok())
    }

    pub fn resolve<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(secs) = parse_secs(&lookup, ENV_TIMEOUT_SECS)? {
            settings.timeout = secs;
        }
        if let Some(secs) = parse_secs(&lookup, ENV_CONNECT_TIMEOUT_SECS)? {
            settings.connect_timeout = secs;
        }
        Ok(settings)
    }
}

fn parse_secs<F>(lookup: &F, name: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<u64>() {
        Ok(0) | Err(_) => Err(UploadActionError::Configuration(format!(
            "{name} must be a positive number of seconds, got '{raw}'"
        ))),
        Ok(secs) => Ok(Some(secs)),
    }
}
