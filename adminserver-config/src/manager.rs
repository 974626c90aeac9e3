//! Configuration manager
//!
//! The manager owns a [`ConfigStore`] and decides what goes into it: compiled
//! defaults and system-scope environment variables at construction, the
//! driver's contents on [`ConfigManager::load`], and a full rebuild from
//! defaults plus the current environment on [`ConfigManager::reset`].
//!
//! Two flavors exist. A local manager seeds itself and persists through a
//! local driver. A remote manager sits on top of a driver that talks to
//! another admin server; the remote side is authoritative, so nothing is
//! seeded locally and reset is refused.

use crate::environment::Environment;
use crate::error::{ConfigError, ConfigResult};
use adminserver_core::{MetadataItem, MetadataRegistry, Scope, TypedValue};
use adminserver_storage::{ConfigDriver, ConfigStore, DriverOptions, StorageResult, UpdateOutcome};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default budget for a single driver call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Budget for calls that touch every key
pub const BULK_TIMEOUT: Duration = Duration::from_secs(120);

/// Time budgets for driver calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    pub default: Duration,
    pub bulk: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            default: DEFAULT_TIMEOUT,
            bulk: BULK_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerMode {
    /// Seeds from defaults and environment, persists locally
    Local,
    /// Mirrors a remote admin server
    Remote,
}

pub struct ConfigManager {
    store: ConfigStore,
    registry: Arc<MetadataRegistry>,
    env: RwLock<Environment>,
    mode: ManagerMode,
    deadlines: Deadlines,
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("mode", &self.mode)
            .field("store", &self.store)
            .field("deadlines", &self.deadlines)
            .finish()
    }
}

impl ConfigManager {
    /// Build a local manager and seed it from defaults and the system-scope
    /// variables of `env`. The driver is not read until [`load`](Self::load).
    pub fn local(
        registry: Arc<MetadataRegistry>,
        driver: Arc<dyn ConfigDriver>,
        env: Environment,
        options: DriverOptions,
    ) -> Self {
        let manager = Self {
            store: ConfigStore::new(registry.clone(), driver, options),
            registry,
            env: RwLock::new(env),
            mode: ManagerMode::Local,
            deadlines: Deadlines::default(),
        };
        manager.seed_initial();
        manager
    }

    /// Build a manager that mirrors a remote admin server through `driver`
    pub fn remote(registry: Arc<MetadataRegistry>, driver: Arc<dyn ConfigDriver>) -> Self {
        Self {
            store: ConfigStore::new(registry.clone(), driver, DriverOptions::default()),
            registry,
            env: RwLock::new(Environment::empty()),
            mode: ManagerMode::Remote,
            deadlines: Deadlines::default(),
        }
    }

    pub fn with_deadlines(mut self, deadlines: Deadlines) -> Self {
        self.deadlines = deadlines;
        self
    }

    pub fn mode(&self) -> ManagerMode {
        self.mode
    }

    pub fn deadlines(&self) -> Deadlines {
        self.deadlines
    }

    pub fn registry(&self) -> &Arc<MetadataRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Swap the environment consulted by the next reset
    pub fn set_environment(&self, env: Environment) {
        *self.env.write() = env;
    }

    fn seed_initial(&self) {
        let env = self.env.read();
        let items = self.registry.all();

        for item in &items {
            if let Some(default) = item.default_value.as_deref() {
                self.seed(item, default, "default");
            }
        }

        for item in items.iter().filter(|item| item.scope == Scope::System) {
            if let Some(value) = item.env_key.as_deref().and_then(|key| env.get(key)) {
                self.seed(item, &value, "environment");
            }
        }
        debug!("Seeded {} values", self.store.len());
    }

    fn seed(&self, item: &MetadataItem, raw: &str, source: &str) {
        match TypedValue::from_item(item, raw) {
            Ok(value) => self.store.set(value),
            Err(e) => warn!(key = %item.name, source, "Ignoring seed value: {}", e),
        }
    }

    /// Every item resolved from its default, overridden by the environment
    /// regardless of scope
    fn fresh_values(&self) -> Vec<TypedValue> {
        let env = self.env.read();
        let mut values: HashMap<String, TypedValue> = HashMap::new();

        for item in self.registry.all() {
            let candidates = [
                item.default_value.clone(),
                item.env_key.as_deref().and_then(|key| env.get(key)),
            ];
            for raw in candidates.into_iter().flatten() {
                match TypedValue::from_item(&item, &raw) {
                    Ok(value) => {
                        values.insert(item.name.clone(), value);
                    }
                    Err(e) => warn!(key = %item.name, "Ignoring seed value: {}", e),
                }
            }
        }
        values.into_values().collect()
    }

    async fn within<T, F>(&self, budget: Duration, operation: &'static str, fut: F) -> ConfigResult<T>
    where
        F: Future<Output = StorageResult<T>>,
    {
        match tokio::time::timeout(budget, fut).await {
            Ok(result) => result.map_err(ConfigError::from),
            Err(_) => {
                warn!(operation, "Driver call exceeded {}s", budget.as_secs());
                Err(ConfigError::Timeout {
                    operation,
                    after: budget,
                })
            }
        }
    }

    /// Pull the driver's contents into memory.
    ///
    /// When a local manager finds an empty store on its first load, every
    /// item is seeded from defaults and the environment and saved.
    pub async fn load(&self) -> ConfigResult<()> {
        let first = !self.store.is_loaded();
        let stored = self
            .within(self.deadlines.default, "load", self.store.load())
            .await?;

        if first && stored == 0 && self.mode == ManagerMode::Local {
            info!("Configuration store is empty, seeding from defaults and environment");
            for value in self.fresh_values() {
                self.store.set(value);
            }
            self.save().await?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> ConfigResult<TypedValue> {
        if !self.registry.contains(name) {
            return Err(ConfigError::UnknownKey(name.to_string()));
        }
        Ok(self.store.get(name)?)
    }

    pub fn get_string(&self, name: &str) -> ConfigResult<String> {
        self.get(name).map(|v| v.get_string())
    }

    pub fn get_int(&self, name: &str) -> ConfigResult<i32> {
        self.get(name).map(|v| v.get_int())
    }

    pub fn get_int64(&self, name: &str) -> ConfigResult<i64> {
        self.get(name).map(|v| v.get_int64())
    }

    pub fn get_bool(&self, name: &str) -> ConfigResult<bool> {
        self.get(name).map(|v| v.get_bool())
    }

    pub fn get_password(&self, name: &str) -> ConfigResult<String> {
        self.get(name).map(|v| v.get_password())
    }

    pub fn get_map(&self, name: &str) -> ConfigResult<Map<String, Value>> {
        self.get(name).map(|v| v.get_map())
    }

    /// Every value in its typed JSON form
    pub fn get_all(&self) -> Map<String, Value> {
        self.store.to_json()
    }

    /// The set values of one metadata group in typed JSON form
    pub fn get_by_group(&self, group: &str) -> Map<String, Value> {
        self.registry
            .by_group(group)
            .into_iter()
            .filter_map(|item| {
                self.store
                    .get_any_type(&item.name)
                    .ok()
                    .map(|value| (item.name, value))
            })
            .collect()
    }

    /// Validate and store one value in memory
    pub fn set(&self, name: &str, raw: &str) -> ConfigResult<()> {
        self.store.set_raw(name, raw)?;
        Ok(())
    }

    /// Persist the whole in-memory map
    pub async fn save(&self) -> ConfigResult<()> {
        self.within(self.deadlines.bulk, "save", self.store.save())
            .await
    }

    /// Apply a bulk update. Unknown or invalid entries are dropped and
    /// reported in the outcome; the accepted ones are persisted.
    pub async fn update(&self, updates: Map<String, Value>) -> ConfigResult<UpdateOutcome> {
        let outcome = self
            .within(self.deadlines.bulk, "update", self.store.update(updates))
            .await?;
        info!(
            "Applied {} configuration updates, dropped {}",
            outcome.applied.len(),
            outcome.dropped.len()
        );
        Ok(outcome)
    }

    /// Rebuild every item from defaults and the current environment and make
    /// the result the persisted state
    pub async fn reset(&self) -> ConfigResult<()> {
        if self.mode == ManagerMode::Remote {
            return Err(ConfigError::Unsupported(
                "reset is not available against a remote admin server".to_string(),
            ));
        }
        let values = self.fresh_values();
        let count = values.len();
        self.within(self.deadlines.bulk, "reset", self.store.replace_all(values))
            .await?;
        info!("Reset configuration to {} values", count);
        Ok(())
    }
}
