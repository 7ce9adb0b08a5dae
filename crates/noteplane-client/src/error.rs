//! Client-construction error types and conversions.

use noteplane_core::error::NoteplaneError;

/// Errors raised while building a transport (never by a request; request
/// failures are [`noteplane_core::error::TransportError`]).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ClientError> for NoteplaneError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Config(message) => NoteplaneError::config(message),
            other => NoteplaneError::config(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;

    #[test]
    fn bad_base_url_is_a_config_error() {
        let err = HttpConfig::default()
            .with_base_url("ftp://notes.example")
            .validate()
            .unwrap_err();
        let err = NoteplaneError::from(err);

        match &err {
            NoteplaneError::Config { message } => assert!(message.contains("ftp://")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!err.is_denial());
        assert!(err.to_string().starts_with("Configuration error:"));
    }
}
