//! Configuration management for the admin server
//!
//! [`ConfigManager`] is the entry point the HTTP layer and embedders use to
//! read and change configuration items. It comes in a local flavor, which
//! seeds itself from compiled defaults and the environment, and a remote
//! flavor that mirrors another admin server.
//!
//! The crate also loads the process-level [`ServiceConfig`] (listen address,
//! driver selection, key path, secrets) from environment variables.

pub mod environment;
pub mod error;
pub mod loader;
pub mod manager;
pub mod service;
pub mod validation;
pub mod views;

pub use environment::Environment;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use manager::{ConfigManager, Deadlines, ManagerMode, BULK_TIMEOUT, DEFAULT_TIMEOUT};
pub use service::{LogFormat, ServiceConfig, StoreDriverKind};
pub use validation::Validatable;
pub use views::{
    ClairDbSettings, DatabaseSettings, EmailSettings, HttpAuthProxySettings, LdapConf,
    LdapGroupConf, OidcSettings, PostgresSettings, UaaSettings,
};
