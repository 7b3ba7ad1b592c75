//! talk-core - Core library for AI Talk
//!
//! This crate provides the client side shared by the `talk` CLI and any other
//! front end of the AI Talk backend:
//!
//! - **client**: HTTP client with request/response interceptors
//! - **api**: request builders per resource (auth, conversations, messages)
//! - **stream**: incremental decoder for `data: <json>` chat streams
//! - **auth**: credential storage behind an injectable trait
//! - **cookies**: housekeeping for oversized `Cookie` headers

pub mod api;
pub mod auth;
pub mod client;
pub mod cookies;
pub mod error;
pub mod stream;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use api::Page;
pub use client::{ApiClient, ClientConfig};
pub use error::{Error, Result};
