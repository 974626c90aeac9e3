//! Client for the admin server configuration API

use crate::auth::Authorizer;
use crate::config::HttpConfig;
use crate::errors::{HttpError, HttpResult};
use reqwest::{Client, Response};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

const CONFIGS_PATH: &str = "api/configs";
const CONFIGURATIONS_PATH: &str = "api/configurations";

/// Talks to the `/api/...` endpoints of a remote admin server
#[derive(Clone)]
pub struct ConfigClient {
    base: Url,
    client: Client,
    authorizer: Arc<dyn Authorizer>,
}

impl std::fmt::Debug for ConfigClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigClient")
            .field("base", &self.base.as_str())
            .finish()
    }
}

impl ConfigClient {
    pub fn new(
        base_url: &str,
        authorizer: Arc<dyn Authorizer>,
        config: HttpConfig,
    ) -> HttpResult<Self> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base = Url::parse(&normalized)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(HttpError::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                base.scheme(),
                base_url
            )));
        }

        debug!(
            "Creating config client for {} with timeout: {}s",
            base,
            config.timeout.as_secs()
        );
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .redirect(reqwest::redirect::Policy::limited(
                config.max_redirects as usize,
            ))
            .build()?;

        Ok(Self {
            base,
            client,
            authorizer,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// Fetch the full configuration of the remote server
    pub async fn get_configs(&self) -> HttpResult<Map<String, JsonValue>> {
        let url = self.endpoint(CONFIGS_PATH)?;
        debug!("GET {}", url);
        let response = self
            .authorizer
            .authorize(self.client.get(url))
            .send()
            .await?;
        let body = Self::check(response).await?.json::<JsonValue>().await?;
        match body {
            JsonValue::Object(map) => Ok(map),
            other => Err(HttpError::ConfigError(format!(
                "expected a JSON object from {}, got {}",
                CONFIGS_PATH,
                json_kind(&other)
            ))),
        }
    }

    /// Push a set of updates to the remote server
    pub async fn update_configs(&self, updates: &Map<String, JsonValue>) -> HttpResult<()> {
        let url = self.endpoint(CONFIGURATIONS_PATH)?;
        debug!("PUT {} ({} keys)", url, updates.len());
        let response = self
            .authorizer
            .authorize(self.client.put(url).json(updates))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> HttpResult<Url> {
        self.base
            .join(path)
            .map_err(|e| HttpError::InvalidUrl(format!("{}{}: {}", self.base, path, e)))
    }

    async fn check(response: Response) -> HttpResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        warn!("Remote admin server answered {}", status);
        Err(HttpError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
