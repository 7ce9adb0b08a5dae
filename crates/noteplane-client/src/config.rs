//! HTTP transport configuration.

use crate::error::ClientError;

pub const API_URL_VAR: &str = "NOTEPLANE_API_URL";
pub const TIMEOUT_VAR: &str = "NOTEPLANE_TIMEOUT_SECS";

/// Configuration for reaching the notes backend.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL without trailing slash (e.g. `http://localhost:8000`).
    pub base_url: String,
    /// Per-request timeout in seconds (default: 30).
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            request_timeout_secs: 30,
            user_agent: concat!("noteplane/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl HttpConfig {
    /// Load from the process environment, after reading a `.env` file if
    /// one exists. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ClientError> {
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_VAR) {
            config.base_url = url;
        }
        if let Some(raw) = lookup(TIMEOUT_VAR) {
            config.request_timeout_secs = raw.trim().parse().map_err(|e| {
                ClientError::Config(format!("{TIMEOUT_VAR} must be a number of seconds: {e}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Normalizes `base_url` and rejects values reqwest could not use.
    pub fn validate(&mut self) -> Result<(), ClientError> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base URL must start with http:// or https://, got `{}`",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ClientError::Config("request timeout must be positive".into()));
        }
        self.base_url = trimmed.to_owned();
        Ok(())
    }
}
