//! Noteplane Core: domain models, error taxonomy, transport traits and
//! the authorization/quota engine.
//!
//! Nothing in this crate performs I/O. The transport traits in
//! [`transport`] are implemented by `noteplane-client`; the decision
//! functions in [`policy`] are pure.

pub mod error;
pub mod models;
pub mod policy;
pub mod transport;

pub use error::{
    AuthError, ForbiddenReason, NoteplaneError, NoteplaneResult, PlanError, QuotaError,
    TransportError, TransportErrorKind, UpgradeRejection,
};
pub use policy::{FREE_NOTE_LIMIT, ViewState};
