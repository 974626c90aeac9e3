//! Typed configuration values

use crate::error::{CoreError, CoreResult};
use crate::metadata::{MetadataItem, MetadataRegistry};
use crate::types::ItemType;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A raw string tied to the declared type of its metadata item.
///
/// Construction validates the string, so a `TypedValue` always satisfies
/// its type. Projections that do not match the declared type return the
/// zero value of the requested kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedValue {
    name: String,
    raw: String,
    item_type: ItemType,
}

impl TypedValue {
    /// Look up `name` in `registry` and validate `raw` against its type
    pub fn new(registry: &MetadataRegistry, name: &str, raw: &str) -> CoreResult<Self> {
        let item = registry
            .get(name)
            .ok_or_else(|| CoreError::UnknownKey(name.to_string()))?;
        Self::from_item(&item, raw)
    }

    pub fn from_item(item: &MetadataItem, raw: &str) -> CoreResult<Self> {
        let raw = item
            .item_type
            .normalize(raw)
            .map_err(|reason| CoreError::invalid_type(&item.name, reason))?;
        Ok(Self {
            name: item.name.clone(),
            raw,
            item_type: item.item_type,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stored (canonical) string
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn get_string(&self) -> String {
        match self.item_type {
            ItemType::String
            | ItemType::NonEmptyString
            | ItemType::Password
            | ItemType::AuthMode
            | ItemType::ProjectCreationRestriction => self.raw.clone(),
            _ => String::new(),
        }
    }

    pub fn get_int(&self) -> i32 {
        match self.item_type {
            ItemType::Int | ItemType::Port | ItemType::LdapScope => {
                self.raw.trim().parse().unwrap_or_default()
            }
            _ => 0,
        }
    }

    pub fn get_int64(&self) -> i64 {
        if self.item_type.is_integer() {
            self.raw.trim().parse().unwrap_or_default()
        } else {
            0
        }
    }

    pub fn get_bool(&self) -> bool {
        self.item_type == ItemType::Bool && self.raw == "true"
    }

    /// Plaintext password as held by the in-memory store
    pub fn get_password(&self) -> String {
        match self.item_type {
            ItemType::Password => self.raw.clone(),
            _ => String::new(),
        }
    }

    /// Parse the value as a JSON object; failures yield an empty map
    pub fn get_map(&self) -> Map<String, Value> {
        serde_json::from_str(&self.raw).unwrap_or_default()
    }

    pub fn get_string_to_string_map(&self) -> HashMap<String, String> {
        serde_json::from_str(&self.raw).unwrap_or_default()
    }

    /// The value in its typed JSON form (numbers, booleans, objects, strings)
    pub fn get_any_type(&self) -> Value {
        self.item_type
            .parse(&self.raw)
            .unwrap_or_else(|_| Value::String(self.raw.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::default_items;
    use serde_json::json;

    fn registry() -> MetadataRegistry {
        MetadataRegistry::with_items(default_items())
    }

    #[test]
    fn test_unknown_key() {
        let err = TypedValue::new(&registry(), "no_such_key", "x").unwrap_err();
        assert_eq!(err, CoreError::UnknownKey("no_such_key".to_string()));
    }

    #[test]
    fn test_invalid_type() {
        let err = TypedValue::new(&registry(), "ldap_timeout", "soon").unwrap_err();
        assert!(matches!(err, CoreError::InvalidType { ref key, .. } if key == "ldap_timeout"));
        assert!(TypedValue::new(&registry(), "ldap_url", "").is_err());
    }

    #[test]
    fn test_bool_is_canonicalized_on_storage() {
        let value = TypedValue::new(&registry(), "ldap_verify_cert", "on").unwrap();
        assert!(value.get_bool());
        assert_eq!(value.raw(), "true");
        assert_eq!(value.get_any_type(), json!(true));
    }

    #[test]
    fn test_numeric_projections() {
        let registry = registry();
        let timeout = TypedValue::new(&registry, "ldap_timeout", "10").unwrap();
        assert_eq!(timeout.get_int(), 10);
        assert_eq!(timeout.get_int64(), 10);
        assert_eq!(timeout.get_any_type(), json!(10));

        let quota = TypedValue::new(&registry, "storage_per_project", "1.073741824e+11").unwrap();
        assert_eq!(quota.get_int64(), 107_374_182_400);
        assert_eq!(quota.raw(), "107374182400");
    }

    #[test]
    fn test_mismatched_projection_returns_zero_value() {
        let registry = registry();
        let url = TypedValue::new(&registry, "ldap_url", "ldap://example.com").unwrap();
        assert_eq!(url.get_int(), 0);
        assert!(!url.get_bool());
        assert_eq!(url.get_password(), "");
        assert!(url.get_map().is_empty());

        let timeout = TypedValue::new(&registry, "ldap_timeout", "10").unwrap();
        assert_eq!(timeout.get_string(), "");
    }

    #[test]
    fn test_map_projections() {
        let registry = registry();
        let policy = TypedValue::new(
            &registry,
            "scan_all_policy",
            r#"{"type":"daily","parameter":{"daily_time":0}}"#,
        )
        .unwrap();
        assert_eq!(policy.get_map()["type"], json!("daily"));
        assert!(policy.get_string_to_string_map().is_empty());
        assert_eq!(policy.get_any_type()["parameter"]["daily_time"], json!(0));
    }

    #[test]
    fn test_password_projection() {
        let value = TypedValue::new(&registry(), "email_password", "s3cr3t").unwrap();
        assert_eq!(value.get_password(), "s3cr3t");
        assert_eq!(value.get_any_type(), json!("s3cr3t"));
    }
}
