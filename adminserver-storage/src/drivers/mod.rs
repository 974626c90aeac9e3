//! Persistence drivers
//!
//! A driver moves a `name -> string` map between memory and some durable or
//! remote medium. Drivers never interpret types; the store and the codec
//! decide what the strings mean.

use crate::error::StorageResult;
use adminserver_core::MetadataRegistry;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub mod database;
pub mod encrypted;
pub mod json;
pub mod memory;
pub mod rest;

pub use database::DatabaseDriver;
pub use encrypted::EncryptedDriver;
pub use json::JsonFileDriver;
pub use memory::InMemoryDriver;
pub use rest::RestDriver;

/// Raw configuration map as seen by a driver
pub type RawConfig = HashMap<String, String>;

/// Backend that loads and saves configuration maps
#[async_trait]
pub trait ConfigDriver: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Read every persisted entry
    async fn load(&self) -> StorageResult<RawConfig>;

    /// Write `cfgs`, leaving other persisted keys untouched
    async fn save(&self, cfgs: RawConfig) -> StorageResult<()>;

    /// Make `cfgs` the whole persisted state
    async fn replace(&self, cfgs: RawConfig) -> StorageResult<()> {
        self.save(cfgs).await
    }
}

#[async_trait]
impl<T: ConfigDriver + ?Sized> ConfigDriver for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn load(&self) -> StorageResult<RawConfig> {
        (**self).load().await
    }

    async fn save(&self, cfgs: RawConfig) -> StorageResult<()> {
        (**self).save(cfgs).await
    }

    async fn replace(&self, cfgs: RawConfig) -> StorageResult<()> {
        (**self).replace(cfgs).await
    }
}

/// Settings shared by the persistent drivers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverOptions {
    /// Persist system-scope keys too (unit-test deployments)
    pub test_mode: bool,
}

impl DriverOptions {
    pub fn test_mode() -> Self {
        Self { test_mode: true }
    }
}

/// Keep only the keys a persistent driver may write
pub(crate) fn persistable(
    registry: &MetadataRegistry,
    cfgs: RawConfig,
    options: DriverOptions,
) -> RawConfig {
    cfgs.into_iter()
        .filter(|(name, _)| {
            let keep = registry.is_persistable(name, options.test_mode);
            if !keep {
                debug!(key = %name, "Skipping key that is unknown or system scoped");
            }
            keep
        })
        .collect()
}

/// Keep only known user-scope keys from a loaded map
pub(crate) fn loadable(registry: &MetadataRegistry, cfgs: RawConfig) -> RawConfig {
    cfgs.into_iter()
        .filter(|(name, _)| registry.is_persistable(name, false))
        .collect()
}
