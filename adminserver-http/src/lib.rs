//! HTTP client functionality for the admin server
//!
//! This crate provides the client used by services that read their
//! configuration from a remote admin server. Every request carries the
//! shared secret through an [`Authorizer`].

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;

// Re-export main types for convenience
pub use auth::{Authorizer, SecretAuthorizer, SECRET_COOKIE_NAME};
pub use client::ConfigClient;
pub use config::HttpConfig;
pub use errors::{HttpError, HttpResult};
