//! Remote admin server driver

use super::{ConfigDriver, RawConfig};
use crate::error::StorageResult;
use adminserver_core::json_to_raw;
use adminserver_http::ConfigClient;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

/// Reads and writes the configuration of a remote admin server.
///
/// `load` fetches `GET /api/configs`; `save` sends `PUT /api/configurations`.
/// The remote server owns persistence and encryption, so values travel as
/// plaintext strings.
#[derive(Debug, Clone)]
pub struct RestDriver {
    client: ConfigClient,
}

impl RestDriver {
    pub fn new(client: ConfigClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ConfigClient {
        &self.client
    }
}

#[async_trait]
impl ConfigDriver for RestDriver {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn load(&self) -> StorageResult<RawConfig> {
        let remote = self.client.get_configs().await?;
        debug!("Fetched {} keys from {}", remote.len(), self.client.base_url());
        Ok(remote
            .iter()
            .map(|(name, value)| (name.clone(), json_to_raw(value)))
            .collect())
    }

    async fn save(&self, cfgs: RawConfig) -> StorageResult<()> {
        let body: Map<String, Value> = cfgs
            .into_iter()
            .map(|(name, value)| (name, Value::String(value)))
            .collect();
        self.client.update_configs(&body).await?;
        Ok(())
    }
}
