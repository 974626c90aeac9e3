//! Item scopes, groups and value types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Where the authoritative value of an item lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Seeded from the environment at startup, never persisted
    System,
    /// Persisted in the configuration store
    User,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::System => write!(f, "system"),
            Scope::User => write!(f, "user"),
        }
    }
}

/// Group tags used for bulk retrieval
pub mod group {
    pub const BASIC: &str = "basic";
    pub const LDAP_BASIC: &str = "ldapbasic";
    pub const LDAP_GROUP: &str = "ldapgroup";
    pub const EMAIL: &str = "email";
    pub const UAA: &str = "uaa";
    pub const HTTP_AUTH: &str = "http_auth";
    pub const OIDC: &str = "oidc";
    pub const DATABASE: &str = "database";
    pub const CLAIR: &str = "clair";
    pub const QUOTA: &str = "quota";
}

/// Authentication modes accepted by the `auth_mode` item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    DbAuth,
    LdapAuth,
    UaaAuth,
    HttpAuth,
    OidcAuth,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::DbAuth => "db_auth",
            AuthMode::LdapAuth => "ldap_auth",
            AuthMode::UaaAuth => "uaa_auth",
            AuthMode::HttpAuth => "http_auth",
            AuthMode::OidcAuth => "oidc_auth",
        }
    }
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "db_auth" => Ok(AuthMode::DbAuth),
            "ldap_auth" => Ok(AuthMode::LdapAuth),
            "uaa_auth" => Ok(AuthMode::UaaAuth),
            "http_auth" => Ok(AuthMode::HttpAuth),
            "oidc_auth" => Ok(AuthMode::OidcAuth),
            other => Err(format!("invalid auth mode '{}'", other)),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PROJECT_CREATION_RESTRICTIONS: [&str; 2] = ["everyone", "adminonly"];

/// Declared type of a configuration item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    String,
    NonEmptyString,
    Int,
    Int64,
    Bool,
    Password,
    Port,
    Map,
    LdapScope,
    AuthMode,
    ProjectCreationRestriction,
}

impl ItemType {
    /// Validate `raw` and return the canonical form that gets stored.
    ///
    /// Bools are canonicalized to `true`/`false` and Int64 values written as
    /// integral floats (`1.073741824e+11`) are rewritten as plain integers.
    /// Everything else is stored as given.
    pub fn normalize(&self, raw: &str) -> Result<String, String> {
        match self {
            ItemType::String | ItemType::Password => Ok(raw.to_string()),
            ItemType::NonEmptyString => {
                if raw.is_empty() {
                    Err("string should not be empty".to_string())
                } else {
                    Ok(raw.to_string())
                }
            }
            ItemType::Int => parse_int(raw).map(|v| v.to_string()),
            ItemType::Int64 => parse_int64(raw).map(|v| v.to_string()),
            ItemType::Bool => parse_bool(raw).map(|v| v.to_string()),
            ItemType::Port => parse_port(raw).map(|_| raw.trim().to_string()),
            ItemType::LdapScope => parse_ldap_scope(raw).map(|v| v.to_string()),
            ItemType::Map => parse_map(raw).map(|_| raw.to_string()),
            ItemType::AuthMode => raw.parse::<AuthMode>().map(|m| m.as_str().to_string()),
            ItemType::ProjectCreationRestriction => {
                if PROJECT_CREATION_RESTRICTIONS.contains(&raw) {
                    Ok(raw.to_string())
                } else {
                    Err(format!(
                        "invalid project creation restriction '{}', expected one of {:?}",
                        raw, PROJECT_CREATION_RESTRICTIONS
                    ))
                }
            }
        }
    }

    pub fn validate(&self, raw: &str) -> Result<(), String> {
        self.normalize(raw).map(|_| ())
    }

    /// Parse `raw` into its JSON representation
    pub fn parse(&self, raw: &str) -> Result<Value, String> {
        match self {
            ItemType::Int => parse_int(raw).map(Value::from),
            ItemType::Int64 => parse_int64(raw).map(Value::from),
            ItemType::Port => parse_port(raw).map(Value::from),
            ItemType::LdapScope => parse_ldap_scope(raw).map(Value::from),
            ItemType::Bool => parse_bool(raw).map(Value::Bool),
            ItemType::Map => parse_map(raw).map(Value::Object),
            _ => self.normalize(raw).map(Value::String),
        }
    }

    pub fn is_password(&self) -> bool {
        matches!(self, ItemType::Password)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ItemType::Int | ItemType::Int64 | ItemType::Port | ItemType::LdapScope
        )
    }
}

/// Same integral-float leniency as `Int64`, narrowed to 32 bits
fn parse_int(raw: &str) -> Result<i32, String> {
    let wide = parse_int64(raw)?;
    i32::try_from(wide).map_err(|_| format!("'{}' is out of range for a 32-bit integer", raw))
}

fn parse_int64(raw: &str) -> Result<i64, String> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Ok(v);
    }
    let float = trimmed
        .parse::<f64>()
        .map_err(|e| format!("'{}' is not an integer: {}", raw, e))?;
    // 2^63 is exactly representable, anything at or above it overflows i64
    let bound = 9.223_372_036_854_775_808e18;
    if !float.is_finite() || float.fract() != 0.0 || float >= bound || float < -bound {
        return Err(format!("'{}' is not an integral value", raw));
    }
    Ok(float as i64)
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" => Ok(true),
        "false" | "off" => Ok(false),
        _ => Err(format!("'{}' is not a boolean", raw)),
    }
}

fn parse_port(raw: &str) -> Result<u16, String> {
    let port = raw
        .trim()
        .parse::<u16>()
        .map_err(|e| format!("'{}' is not a port number: {}", raw, e))?;
    if port == 0 {
        return Err("port should be between 1 and 65535".to_string());
    }
    Ok(port)
}

fn parse_ldap_scope(raw: &str) -> Result<i32, String> {
    let scope = parse_int(raw)?;
    if !(0..=2).contains(&scope) {
        return Err(format!("ldap scope should be 0, 1 or 2, got {}", scope));
    }
    Ok(scope)
}

fn parse_map(raw: &str) -> Result<Map<String, Value>, String> {
    serde_json::from_str::<Map<String, Value>>(raw)
        .map_err(|e| format!("value is not a JSON object: {}", e))
}

/// Render a JSON scalar as the raw string a store would hold.
///
/// Strings are taken verbatim, numbers and booleans use their JSON text,
/// objects and arrays are serialized.
pub fn json_to_raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
