//! Error types for Noteplane.
//!
//! Every denial the engine produces is a distinct variant so that the
//! presentation layer can render a precise message. No error here is
//! fatal: each one returns control to the caller with prior state intact.

use std::fmt;

use thiserror::Error;

/// Why an authorization check refused an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenReason {
    /// The action requires the `admin` role.
    NotAdmin,
    /// The subject belongs to a different tenant than the actor.
    CrossTenant,
    /// Only the owner of a note (or an admin) may change it.
    NotOwner,
}

impl fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotAdmin => "admin role required",
            Self::CrossTenant => "subject belongs to another tenant",
            Self::NotOwner => "only the owner or an admin may modify this note",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredential,

    #[error("forbidden: {reason}")]
    Forbidden { reason: ForbiddenReason },

    #[error("not signed in or session expired")]
    Unauthenticated,
}

impl AuthError {
    pub fn forbidden(reason: ForbiddenReason) -> Self {
        Self::Forbidden { reason }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuotaError {
    #[error("free plan limit reached (max {limit} notes); ask an admin to upgrade")]
    FreeLimitReached { limit: u32 },
}

/// Why a plan upgrade was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeRejection {
    AlreadyPro,
    NotAdmin,
    /// Rejected by the backend; carries its `detail` message.
    Backend(String),
}

impl fmt::Display for UpgradeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyPro => f.write_str("tenant is already on the pro plan"),
            Self::NotAdmin => f.write_str("only admins can upgrade the tenant plan"),
            Self::Backend(detail) => write!(f, "{detail}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("plan upgrade rejected: {reason}")]
    UpgradeRejected { reason: UpgradeRejection },
}

/// What went wrong on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request never produced a response (connect, timeout, TLS).
    Network(String),
    /// The server answered with a non-2xx status.
    Status { status: u16, detail: Option<String> },
    /// The response body could not be decoded.
    Decode(String),
}

/// A failed transport call, tagged with the operation that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {kind}")]
pub struct TransportError {
    pub operation: &'static str,
    pub kind: TransportErrorKind,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Status {
                status,
                detail: Some(detail),
            } => write!(f, "HTTP {status}: {detail}"),
            Self::Status {
                status,
                detail: None,
            } => write!(f, "HTTP {status}"),
            Self::Decode(msg) => write!(f, "invalid response body: {msg}"),
        }
    }
}

impl TransportError {
    pub fn network(operation: &'static str, msg: impl Into<String>) -> Self {
        Self {
            operation,
            kind: TransportErrorKind::Network(msg.into()),
        }
    }

    pub fn status(operation: &'static str, status: u16, detail: Option<String>) -> Self {
        Self {
            operation,
            kind: TransportErrorKind::Status { status, detail },
        }
    }

    pub fn decode(operation: &'static str, msg: impl Into<String>) -> Self {
        Self {
            operation,
            kind: TransportErrorKind::Decode(msg.into()),
        }
    }

    /// HTTP status of the failed call, if the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self.kind {
            TransportErrorKind::Status { status, .. } => Some(status),
            _ => None,
        }
    }

    /// Server-provided `detail` message, if any.
    pub fn detail(&self) -> Option<&str> {
        match &self.kind {
            TransportErrorKind::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

#[derive(Debug, Error)]
pub enum NoteplaneError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// The client could not be set up (bad base URL, timeout, TLS backend).
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl NoteplaneError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// `true` when the error is a client-side or server-side denial rather
    /// than a failure to reach the server.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::Forbidden { .. }) | Self::Quota(_) | Self::Plan(_)
        )
    }
}

pub type NoteplaneResult<T> = Result<T, NoteplaneError>;
