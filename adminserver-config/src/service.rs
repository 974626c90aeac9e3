//! Process settings of the admin server

use crate::error::{ConfigError, ConfigResult};
use crate::manager::{Deadlines, BULK_TIMEOUT, DEFAULT_TIMEOUT};
use crate::validation::{
    validate_enum_choice, validate_positive, validate_required_string, validate_url, Validatable,
};
use adminserver_storage::DriverOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SQLITE_PATH: &str = "/data/adminserver/config.db";
pub const DEFAULT_CAPACITY_PATH: &str = "/data";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Which local driver persists the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreDriverKind {
    Database,
    Json,
    Memory,
}

impl StoreDriverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreDriverKind::Database => "database",
            StoreDriverKind::Json => "json",
            StoreDriverKind::Memory => "memory",
        }
    }
}

impl FromStr for StoreDriverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "database" | "db" => Ok(StoreDriverKind::Database),
            "json" => Ok(StoreDriverKind::Json),
            "memory" => Ok(StoreDriverKind::Memory),
            other => Err(format!("unknown store driver '{}'", other)),
        }
    }
}

impl fmt::Display for StoreDriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Settings the server process needs before any configuration item is read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub port: u16,
    pub key_path: PathBuf,
    pub store_driver: StoreDriverKind,
    #[serde(skip_serializing)]
    pub database_url: String,
    pub json_store_path: PathBuf,
    #[serde(skip_serializing)]
    pub secrets: Vec<String>,
    pub reset_on_start: bool,
    pub test_mode: bool,
    pub capacity_path: PathBuf,
    pub log_level: String,
    pub log_format: LogFormat,
    pub request_timeout: Duration,
    pub bulk_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            key_path: PathBuf::from(adminserver_storage::DEFAULT_KEY_PATH),
            store_driver: StoreDriverKind::Database,
            database_url: String::new(),
            json_store_path: PathBuf::from(adminserver_storage::drivers::json::DEFAULT_JSON_STORE_PATH),
            secrets: Vec::new(),
            reset_on_start: false,
            test_mode: false,
            capacity_path: PathBuf::from(DEFAULT_CAPACITY_PATH),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            request_timeout: DEFAULT_TIMEOUT,
            bulk_timeout: BULK_TIMEOUT,
        }
    }
}

impl ServiceConfig {
    /// Address the HTTP server listens on
    pub fn socket_addr(&self) -> ConfigResult<SocketAddr> {
        let ip: IpAddr = self
            .bind_address
            .parse()
            .map_err(|e| self.validation_error(format!("Invalid bind address: {}", e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn deadlines(&self) -> Deadlines {
        Deadlines {
            default: self.request_timeout,
            bulk: self.bulk_timeout,
        }
    }

    pub fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            test_mode: self.test_mode,
        }
    }
}

impl Validatable for ServiceConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.bind_address, "bind_address", self.domain_name())?;
        self.socket_addr()?;
        validate_positive(self.port, "port", self.domain_name())?;
        validate_positive(
            self.request_timeout.as_secs(),
            "request_timeout",
            self.domain_name(),
        )?;
        validate_positive(self.bulk_timeout.as_secs(), "bulk_timeout", self.domain_name())?;
        validate_enum_choice(&self.log_level, &LOG_LEVELS, "log_level", self.domain_name())?;

        match self.store_driver {
            StoreDriverKind::Database => {
                validate_url(&self.database_url, "database_url", self.domain_name())?
            }
            StoreDriverKind::Json => {
                if self.json_store_path.as_os_str().is_empty() {
                    return Err(self.validation_error("json_store_path cannot be empty"));
                }
            }
            StoreDriverKind::Memory => {}
        }

        if self.secrets.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Domain {
                domain: self.domain_name().to_string(),
                message: "secrets cannot be blank".to_string(),
            });
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "server"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ServiceConfig {
        ServiceConfig {
            database_url: "sqlite::memory:".to_string(),
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn test_default_settings_need_a_database_url() {
        assert!(ServiceConfig::default().validate().is_err());
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServiceConfig {
            bind_address: "127.0.0.1".to_string(),
            port: 9000,
            ..valid()
        };
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9000");

        let config = ServiceConfig {
            bind_address: "localhost:80".to_string(),
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = ServiceConfig {
            log_level: "loud".to_string(),
            ..valid()
        };
        assert!(config.validate().is_err());

        let config = ServiceConfig {
            request_timeout: Duration::ZERO,
            ..valid()
        };
        assert!(config.validate().is_err());

        let config = ServiceConfig {
            secrets: vec![" ".to_string()],
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_driver_kind_parsing() {
        assert_eq!("JSON".parse::<StoreDriverKind>().unwrap(), StoreDriverKind::Json);
        assert_eq!("db".parse::<StoreDriverKind>().unwrap(), StoreDriverKind::Database);
        assert!("redis".parse::<StoreDriverKind>().is_err());
    }

    #[test]
    fn test_memory_driver_needs_no_database() {
        let config = ServiceConfig {
            store_driver: StoreDriverKind::Memory,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.deadlines(), Deadlines::default());
    }
}
