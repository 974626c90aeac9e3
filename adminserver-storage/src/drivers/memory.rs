//! In-memory driver

use super::{ConfigDriver, RawConfig};
use crate::error::StorageResult;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Mutex-guarded map, used by tests and in-memory deployments
#[derive(Debug, Default)]
pub struct InMemoryDriver {
    cfgs: Mutex<RawConfig>,
}

impl InMemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(cfgs: RawConfig) -> Self {
        Self {
            cfgs: Mutex::new(cfgs),
        }
    }

    /// Copy of the currently held map
    pub fn snapshot(&self) -> RawConfig {
        self.cfgs.lock().clone()
    }
}

#[async_trait]
impl ConfigDriver for InMemoryDriver {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> StorageResult<RawConfig> {
        Ok(self.cfgs.lock().clone())
    }

    async fn save(&self, cfgs: RawConfig) -> StorageResult<()> {
        self.cfgs.lock().extend(cfgs);
        Ok(())
    }

    async fn replace(&self, cfgs: RawConfig) -> StorageResult<()> {
        *self.cfgs.lock() = cfgs;
        Ok(())
    }
}
