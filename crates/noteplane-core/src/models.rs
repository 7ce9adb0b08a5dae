//! Domain models for Noteplane.
//!
//! These are the core types shared across all crates, including the wire
//! records the transport layer exchanges with the backend.

pub mod membership;
pub mod note;
pub mod session;
pub mod tenant;
pub mod user;
