//! Token inspection error types.

use noteplane_core::error::{AuthError, NoteplaneError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not a JWT: {0}")]
    Malformed(String),

    #[error("token has expired")]
    Expired,
}

impl From<TokenError> for NoteplaneError {
    fn from(_: TokenError) -> Self {
        NoteplaneError::Auth(AuthError::Unauthenticated)
    }
}
