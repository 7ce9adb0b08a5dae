//! Noteplane Auth: identity context, login/logout orchestration and
//! bearer-token inspection.

pub mod config;
pub mod error;
pub mod identity;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::TokenError;
pub use identity::{IdentityContext, Session};
pub use service::{AuthService, LoginOutput};
pub use token::TokenClaims;
