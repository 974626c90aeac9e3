//! Service settings loading from environment variables

use crate::environment::Environment;
use crate::error::{ConfigError, ConfigResult};
use crate::service::{ServiceConfig, DEFAULT_SQLITE_PATH};
use crate::validation::Validatable;
use crate::views::PostgresSettings;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Builds [`ServiceConfig`] from defaults overridden by environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    env: Environment,
}

impl ConfigLoader {
    /// Loader over the process environment
    pub fn new() -> Self {
        Self {
            env: Environment::process(),
        }
    }

    pub fn with_environment(env: Environment) -> Self {
        Self { env }
    }

    /// Load and validate the settings
    pub fn load(&self) -> ConfigResult<ServiceConfig> {
        let mut config = ServiceConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&self, config: &mut ServiceConfig) -> ConfigResult<()> {
        if let Some(bind) = self.env.get("ADMINSERVER_BIND_ADDRESS") {
            config.bind_address = bind;
        }
        if let Some(port) = self.env.get("PORT") {
            config.port = parse_var("PORT", &port)?;
        }
        if let Some(path) = self.env.get("KEY_PATH") {
            config.key_path = PathBuf::from(path);
        }
        if let Some(kind) = self.env.get("CFG_STORE_DRIVER") {
            config.store_driver = parse_var("CFG_STORE_DRIVER", &kind)?;
        }
        if let Some(path) = self.env.get("JSON_CFG_STORE_PATH") {
            config.json_store_path = PathBuf::from(path);
        }
        if let Some(path) = self.env.get("CAPACITY_PATH") {
            config.capacity_path = PathBuf::from(path);
        }

        config.database_url = self.database_url()?;
        config.secrets = ["UI_SECRET", "JOBSERVICE_SECRET"]
            .iter()
            .filter_map(|key| self.env.get(key))
            .filter(|secret| !secret.is_empty())
            .collect();
        config.reset_on_start = self.env.flag("RESET");
        config.test_mode = self.env.flag("UTTEST");

        if let Some(level) = self.env.get("LOG_LEVEL") {
            config.log_level = level.to_ascii_lowercase();
        }
        if let Some(format) = self.env.get("LOG_FORMAT") {
            config.log_format = parse_var("LOG_FORMAT", &format)?;
        }
        if let Some(timeout) = self.env.get("REQUEST_TIMEOUT_SECONDS") {
            config.request_timeout =
                Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECONDS", &timeout)?);
        }
        if let Some(timeout) = self.env.get("BULK_TIMEOUT_SECONDS") {
            config.bulk_timeout = Duration::from_secs(parse_var("BULK_TIMEOUT_SECONDS", &timeout)?);
        }
        Ok(())
    }

    /// `DATABASE_URL`, or a URL assembled from `DATABASE_TYPE` and its
    /// connection variables
    fn database_url(&self) -> ConfigResult<String> {
        if let Some(url) = self.env.get("DATABASE_URL").filter(|url| !url.is_empty()) {
            return Ok(url);
        }

        let database_type = self
            .env
            .get("DATABASE_TYPE")
            .unwrap_or_else(|| "postgresql".to_string());
        match database_type.to_ascii_lowercase().as_str() {
            "sqlite" => {
                let path = self
                    .env
                    .get("SQLITE_PATH")
                    .unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string());
                Ok(format!("sqlite://{}?mode=rwc", path))
            }
            "postgresql" | "postgres" => {
                let settings = PostgresSettings {
                    host: self.var_or("POSTGRESQL_HOST", "postgresql"),
                    port: parse_var("POSTGRESQL_PORT", &self.var_or("POSTGRESQL_PORT", "5432"))?,
                    username: self.var_or("POSTGRESQL_USERNAME", "postgres"),
                    password: self.var_or("POSTGRESQL_PASSWORD", "root123"),
                    database: self.var_or("POSTGRESQL_DATABASE", "registry"),
                    sslmode: self.var_or("POSTGRESQL_SSLMODE", "disable"),
                };
                Ok(settings.connection_url())
            }
            other => Err(ConfigError::Env(format!(
                "Invalid DATABASE_TYPE: unsupported database '{}'",
                other
            ))),
        }
    }

    fn var_or(&self, key: &str, default: &str) -> String {
        self.env.get(key).unwrap_or_else(|| default.to_string())
    }
}

fn parse_var<T>(key: &str, value: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::Env(format!("Invalid {}: {}", key, e)))
}
