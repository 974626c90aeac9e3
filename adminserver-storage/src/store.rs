//! In-memory configuration store
//!
//! The store keeps one [`TypedValue`] per configuration name in a concurrent
//! map. Reads and writes are per-key; there is no cross-key atomicity, and
//! [`ConfigStore::save`] persists whatever each key holds at the moment it
//! is visited.

use crate::drivers::{persistable, ConfigDriver, DriverOptions, RawConfig};
use crate::error::StorageResult;
use adminserver_core::{json_to_raw, CoreError, CoreResult, MetadataRegistry, TypedValue};
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of a bulk update
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Keys that were validated and stored
    pub applied: Vec<String>,
    /// Keys that were dropped, with the reason
    pub dropped: Vec<(String, CoreError)>,
}

/// Typed value table backed by a driver
pub struct ConfigStore {
    values: DashMap<String, TypedValue>,
    registry: Arc<MetadataRegistry>,
    driver: Arc<dyn ConfigDriver>,
    options: DriverOptions,
    loaded: AtomicBool,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("driver", &self.driver.name())
            .field("entries", &self.values.len())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl ConfigStore {
    pub fn new(
        registry: Arc<MetadataRegistry>,
        driver: Arc<dyn ConfigDriver>,
        options: DriverOptions,
    ) -> Self {
        Self {
            values: DashMap::new(),
            registry,
            driver,
            options,
            loaded: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &Arc<MetadataRegistry> {
        &self.registry
    }

    pub fn driver(&self) -> &Arc<dyn ConfigDriver> {
        &self.driver
    }

    /// Whether `load` has completed at least once
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Write a value to memory only
    pub fn set(&self, value: TypedValue) {
        self.values.insert(value.name().to_string(), value);
    }

    /// Validate `raw` against the registry and store it in memory
    pub fn set_raw(&self, name: &str, raw: &str) -> CoreResult<()> {
        let value = TypedValue::new(&self.registry, name, raw)?;
        self.set(value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> CoreResult<TypedValue> {
        self.values
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CoreError::NotSet(name.to_string()))
    }

    /// The value in its typed JSON form
    pub fn get_any_type(&self, name: &str) -> CoreResult<Value> {
        self.get(name).map(|value| value.get_any_type())
    }

    /// Every stored value rendered as typed JSON
    pub fn to_json(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().get_any_type()))
            .collect()
    }

    /// Every stored value as its raw string
    pub fn to_raw_map(&self) -> RawConfig {
        self.values
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().raw().to_string()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pull every entry from the driver into memory.
    ///
    /// Entries that are unknown or fail validation are logged and skipped.
    /// Returns the number of entries stored.
    pub async fn load(&self) -> StorageResult<usize> {
        let cfgs = self.driver.load().await?;
        let mut stored = 0;
        for (name, raw) in cfgs {
            match TypedValue::new(&self.registry, &name, &raw) {
                Ok(value) => {
                    self.set(value);
                    stored += 1;
                }
                Err(e) => warn!(key = %name, "Skipping stored value: {}", e),
            }
        }
        self.loaded.store(true, Ordering::Release);
        debug!("Loaded {} values from {} driver", stored, self.driver.name());
        Ok(stored)
    }

    /// Persist the whole in-memory map. Passwords go out as plaintext; sealing
    /// them is the driver's job.
    pub async fn save(&self) -> StorageResult<()> {
        let cfgs = persistable(&self.registry, self.to_raw_map(), self.options);
        self.driver.save(cfgs).await
    }

    /// Validate and store each entry of `updates`, then persist the ones
    /// that were accepted. Invalid or unknown entries are dropped.
    pub async fn update(&self, updates: Map<String, Value>) -> StorageResult<UpdateOutcome> {
        let mut outcome = UpdateOutcome::default();
        let mut accepted = HashMap::new();

        for (name, value) in updates {
            match TypedValue::new(&self.registry, &name, &json_to_raw(&value)) {
                Ok(typed) => {
                    accepted.insert(name.clone(), typed.raw().to_string());
                    self.set(typed);
                    outcome.applied.push(name);
                }
                Err(e) => {
                    warn!(key = %name, "Dropping configuration update: {}", e);
                    outcome.dropped.push((name, e));
                }
            }
        }

        let cfgs = persistable(&self.registry, accepted, self.options);
        self.driver.save(cfgs).await?;
        Ok(outcome)
    }

    /// Swap the in-memory map for `values` and make the persistable part the
    /// driver's whole state.
    ///
    /// New values are written before stale keys are removed, so a key present
    /// in both the old and new map is never observed as unset.
    pub async fn replace_all(&self, values: Vec<TypedValue>) -> StorageResult<()> {
        let keep: HashSet<String> = values.iter().map(|v| v.name().to_string()).collect();
        for value in values {
            self.set(value);
        }
        self.values.retain(|name, _| keep.contains(name));
        let cfgs = persistable(&self.registry, self.to_raw_map(), self.options);
        self.driver.replace(cfgs).await
    }
}
