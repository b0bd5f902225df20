//! Thin HTTP wrapper over the warehouse backend.
//!
//! Stateless: each operation is one request/response exchange. Errors are
//! normalized to a single failure shape carrying a human-readable message
//! extracted from the response body when present.

pub mod client;
pub mod error;

pub use client::{BackendClient, BackendConfig, DEFAULT_BASE_URL, DEFAULT_CHAT_URL};
pub use error::{BackendError, Result};
