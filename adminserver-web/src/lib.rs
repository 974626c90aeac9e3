//! Web utilities for the admin server API
//!
//! Shared-secret authentication, request IDs and the error type the
//! middleware renders.

pub mod errors;
pub mod middleware;

pub use errors::{WebError, WebResult};
pub use middleware::{
    auth_middleware, request_id_middleware, Authenticator, RequestId, SecretAuthenticator,
    REQUEST_ID_HEADER, SECRET_COOKIE_NAME,
};
