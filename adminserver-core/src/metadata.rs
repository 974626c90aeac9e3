//! Metadata registry
//!
//! The registry is the single authority on what a configuration name means:
//! its scope, group, declared type, default value and environment key. It is
//! populated once at startup and read by every other component before a
//! value is parsed, validated or persisted.

use crate::error::{CoreError, CoreResult};
use crate::items::default_items;
use crate::types::{ItemType, Scope};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Description of one configuration item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataItem {
    pub name: String,
    pub scope: Scope,
    pub group: String,
    /// Environment variable consulted for the initial value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub item_type: ItemType,
    /// Hint for external UIs, ignored by the engine
    pub editable: bool,
}

impl MetadataItem {
    pub fn new(name: &str, scope: Scope, group: &str, item_type: ItemType) -> Self {
        Self {
            name: name.to_string(),
            scope,
            group: group.to_string(),
            env_key: None,
            default_value: None,
            item_type,
            editable: false,
        }
    }

    pub fn system(name: &str, group: &str, item_type: ItemType) -> Self {
        Self::new(name, Scope::System, group, item_type)
    }

    pub fn user(name: &str, group: &str, item_type: ItemType) -> Self {
        Self::new(name, Scope::User, group, item_type)
    }

    pub fn env(mut self, key: &str) -> Self {
        self.env_key = (!key.is_empty()).then(|| key.to_string());
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default_value = (!value.is_empty()).then(|| value.to_string());
        self
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    pub fn is_system(&self) -> bool {
        self.scope == Scope::System
    }
}

/// Read-mostly table of known configuration items
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    items: RwLock<HashMap<String, MetadataItem>>,
}

impl MetadataRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding `items`
    ///
    /// # Panics
    ///
    /// Panics if two items share a name.
    pub fn with_items(items: Vec<MetadataItem>) -> Self {
        let registry = Self::new();
        registry.register(items);
        registry
    }

    /// Add `items`, rejecting the whole batch when any name is already taken
    pub fn try_register(&self, items: Vec<MetadataItem>) -> CoreResult<()> {
        let mut table = self.items.write();
        let mut seen = HashSet::new();
        for item in &items {
            if table.contains_key(&item.name) || !seen.insert(item.name.as_str()) {
                return Err(CoreError::DuplicateKey(item.name.clone()));
            }
        }
        for item in items {
            table.insert(item.name.clone(), item);
        }
        Ok(())
    }

    /// Add `items` to the registry
    ///
    /// # Panics
    ///
    /// Panics on duplicate names; the item list is compiled in, so a
    /// duplicate is a programming error.
    pub fn register(&self, items: Vec<MetadataItem>) {
        if let Err(e) = self.try_register(items) {
            panic!("failed to register configuration metadata: {}", e);
        }
    }

    /// Drop every item and register `items` instead
    pub fn reinit(&self, items: Vec<MetadataItem>) {
        self.items.write().clear();
        self.register(items);
    }

    pub fn get(&self, name: &str) -> Option<MetadataItem> {
        self.items.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.read().contains_key(name)
    }

    pub fn item_type(&self, name: &str) -> Option<ItemType> {
        self.items.read().get(name).map(|item| item.item_type)
    }

    /// Snapshot of every item, in no particular order
    pub fn all(&self) -> Vec<MetadataItem> {
        self.items.read().values().cloned().collect()
    }

    pub fn by_group(&self, group: &str) -> Vec<MetadataItem> {
        self.filter(|item| item.group == group)
    }

    pub fn by_scope(&self, scope: Scope) -> Vec<MetadataItem> {
        self.filter(|item| item.scope == scope)
    }

    /// Names of every item whose type is Password
    pub fn password_keys(&self) -> HashSet<String> {
        self.items
            .read()
            .values()
            .filter(|item| item.item_type.is_password())
            .map(|item| item.name.clone())
            .collect()
    }

    /// Whether a value under `name` may be written to persistent storage
    pub fn is_persistable(&self, name: &str, include_system: bool) -> bool {
        match self.items.read().get(name) {
            Some(item) => include_system || !item.is_system(),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    fn filter(&self, predicate: impl Fn(&MetadataItem) -> bool) -> Vec<MetadataItem> {
        self.items
            .read()
            .values()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }
}

static GLOBAL_REGISTRY: Lazy<Arc<MetadataRegistry>> =
    Lazy::new(|| Arc::new(MetadataRegistry::with_items(default_items())));

/// Process-wide registry seeded with the compiled-in item list
pub fn registry() -> Arc<MetadataRegistry> {
    GLOBAL_REGISTRY.clone()
}
