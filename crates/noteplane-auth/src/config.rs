//! Authentication configuration.

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Seconds before a token's `exp` at which the session is already
    /// treated as expired (default: 30).
    pub expiry_leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            expiry_leeway_secs: 30,
        }
    }
}
