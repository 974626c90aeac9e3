//! Shared-secret authentication middleware
//!
//! Peer services present a `secret` cookie. The request passes when the
//! cookie matches one of the configured secrets; an empty secret set turns
//! authentication off.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use async_trait::async_trait;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, error};

use crate::errors::{WebError, WebResult};

/// Cookie carrying the shared secret
pub const SECRET_COOKIE_NAME: &str = "secret";

/// Decides whether a request may reach the API.
///
/// `Ok(false)` is a denial (401); an error means the decision could not be
/// made (500).
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, headers: &HeaderMap) -> WebResult<bool>;
}

/// Accepts requests whose `secret` cookie matches a configured secret
#[derive(Clone, Default)]
pub struct SecretAuthenticator {
    secrets: Vec<String>,
}

impl std::fmt::Debug for SecretAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretAuthenticator")
            .field("secrets", &self.secrets.len())
            .finish()
    }
}

impl SecretAuthenticator {
    /// Blank secrets are ignored
    pub fn new<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            secrets: secrets
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    /// Whether every request is let through
    pub fn is_disabled(&self) -> bool {
        self.secrets.is_empty()
    }

    fn matches(&self, presented: &str) -> bool {
        // Check every secret so timing does not reveal which one matched
        self.secrets.iter().fold(false, |found, secret| {
            found | bool::from(secret.as_bytes().ct_eq(presented.as_bytes()))
        })
    }
}

#[async_trait]
impl Authenticator for SecretAuthenticator {
    async fn authenticate(&self, headers: &HeaderMap) -> WebResult<bool> {
        if self.is_disabled() {
            return Ok(true);
        }
        match cookie_value(headers, SECRET_COOKIE_NAME) {
            Some(presented) => Ok(self.matches(&presented)),
            None => {
                debug!("Request carries no secret cookie");
                Ok(false)
            }
        }
    }
}

/// First value of the named cookie across all `Cookie` headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}

/// Reject requests the authenticator does not accept
pub async fn auth_middleware(
    State(authenticator): State<Arc<dyn Authenticator>>,
    request: Request,
    next: Next,
) -> Response {
    match authenticator.authenticate(request.headers()).await {
        Ok(true) => next.run(request).await,
        Ok(false) => WebError::Unauthorized.into_response(),
        Err(e) => {
            error!("Authentication failed: {}", e);
            WebError::internal(e.to_string()).into_response()
        }
    }
}
