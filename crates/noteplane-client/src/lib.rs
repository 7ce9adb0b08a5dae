//! Noteplane transports: concrete implementations of the
//! `noteplane-core` transport traits.
//!
//! This crate provides:
//! - An HTTP client for the notes backend ([`HttpTransport`], [`HttpConfig`])
//! - An in-process backend with seeded demo data ([`MemoryBackend`])
//! - Error types ([`ClientError`])

mod config;
mod error;
mod http;
mod memory;

pub use config::{API_URL_VAR, HttpConfig, TIMEOUT_VAR};
pub use error::ClientError;
pub use http::HttpTransport;
pub use memory::{DEMO_PASSWORD, MemoryBackend};
