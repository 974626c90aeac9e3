//! Request authorizers

use reqwest::header::{HeaderValue, COOKIE};
use reqwest::RequestBuilder;

/// Cookie carrying the shared secret between peer services
pub const SECRET_COOKIE_NAME: &str = "secret";

/// Attaches credentials to an outgoing request
pub trait Authorizer: Send + Sync {
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder;
}

/// Sends the shared secret as the `secret` cookie
#[derive(Clone)]
pub struct SecretAuthorizer {
    secret: String,
}

impl SecretAuthorizer {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for SecretAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretAuthorizer")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Authorizer for SecretAuthorizer {
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match HeaderValue::from_str(&format!("{}={}", SECRET_COOKIE_NAME, self.secret)) {
            Ok(value) => request.header(COOKIE, value),
            Err(_) => {
                tracing::warn!("Shared secret contains characters not allowed in a cookie, sending request without it");
                request
            }
        }
    }
}
