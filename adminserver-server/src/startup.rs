//! Server startup and shutdown logic

use adminserver_caching::CachedDriver;
use adminserver_config::{
    ConfigManager, Environment, ServiceConfig, StoreDriverKind, DEFAULT_TIMEOUT,
};
use adminserver_core::MetadataRegistry;
use adminserver_http::{ConfigClient, HttpConfig, SecretAuthorizer};
use adminserver_rest_api::{create_rest_app, AppConfig, AppContext, CapacityProbe};
use adminserver_storage::seaorm::{DatabaseConfig, DatabaseConnection};
use adminserver_storage::{
    encryption, ConfigDriver, DatabaseDriver, EncryptedDriver, InMemoryDriver, JsonFileDriver,
    RestDriver, SecretCodec,
};
use adminserver_web::{Authenticator, SecretAuthenticator};
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tracing::{info, warn};

use crate::capacity::DiskCapacityProbe;

/// Build the persistence driver selected by `config.store_driver`.
///
/// The relational driver runs its migrations before it is handed out.
pub async fn build_driver(
    config: &ServiceConfig,
    registry: Arc<MetadataRegistry>,
) -> Result<Arc<dyn ConfigDriver>> {
    let options = config.driver_options();
    let driver: Arc<dyn ConfigDriver> = match config.store_driver {
        StoreDriverKind::Database => {
            let codec = secret_codec(config, &registry);
            let db = DatabaseConnection::new(DatabaseConfig::new(&config.database_url))
                .await
                .context("Failed to connect to the configuration database")?;
            db.migrate()
                .await
                .context("Failed to migrate the configuration database")?;
            Arc::new(DatabaseDriver::new(db, codec, registry, options))
        }
        StoreDriverKind::Json => {
            let codec = secret_codec(config, &registry);
            let inner = JsonFileDriver::new(&config.json_store_path, registry, options);
            Arc::new(EncryptedDriver::new(inner, codec))
        }
        StoreDriverKind::Memory => Arc::new(InMemoryDriver::new()),
    };

    info!("Using {} configuration driver", driver.name());
    Ok(driver)
}

fn secret_codec(config: &ServiceConfig, registry: &MetadataRegistry) -> SecretCodec {
    SecretCodec::new(encryption::init_global(&config.key_path), registry)
}

/// Manager that reads and writes through a remote admin server.
///
/// Responses are cached for the interval the server itself advertises in
/// `cfg_cache_interval_seconds`.
pub fn remote_manager(
    base_url: &str,
    secret: &str,
    registry: Arc<MetadataRegistry>,
) -> Result<ConfigManager> {
    let config = HttpConfig {
        timeout: DEFAULT_TIMEOUT,
        ..HttpConfig::default()
    };
    let client = ConfigClient::new(base_url, Arc::new(SecretAuthorizer::new(secret)), config)
        .with_context(|| format!("Invalid admin server URL {}", base_url))?;
    let driver = CachedDriver::new(RestDriver::new(client));
    Ok(ConfigManager::remote(registry, Arc::new(driver)))
}

/// Admin server application
pub struct Server {
    config: ServiceConfig,
    manager: Arc<ConfigManager>,
    authenticator: Arc<dyn Authenticator>,
    capacity: Arc<dyn CapacityProbe>,
}

impl Server {
    /// Assemble the driver and manager described by `config`
    pub async fn new(config: ServiceConfig) -> Result<Self> {
        let registry = adminserver_core::registry();
        let driver = build_driver(&config, registry.clone()).await?;
        let manager = ConfigManager::local(
            registry,
            driver,
            Environment::process(),
            config.driver_options(),
        )
        .with_deadlines(config.deadlines());

        let authenticator = SecretAuthenticator::new(config.secrets.clone());
        if authenticator.is_disabled() {
            warn!("No UI_SECRET or JOBSERVICE_SECRET configured, API authentication is disabled");
        }
        let capacity = DiskCapacityProbe::new(&config.capacity_path);

        Ok(Self {
            config,
            manager: Arc::new(manager),
            authenticator: Arc::new(authenticator),
            capacity: Arc::new(capacity),
        })
    }

    pub fn manager(&self) -> &Arc<ConfigManager> {
        &self.manager
    }

    /// Bring the store up: optional reset, then load (seeding an empty store)
    pub async fn prepare(&self) -> Result<()> {
        if self.config.reset_on_start {
            info!("RESET is set, rebuilding configuration from defaults and environment");
            self.manager
                .reset()
                .await
                .context("Failed to reset configuration")?;
        }
        self.manager
            .load()
            .await
            .context("Failed to load configuration")?;
        Ok(())
    }

    /// Build the complete application router
    pub fn build_app(&self) -> Router {
        let context = AppContext::new(
            self.manager.clone(),
            self.authenticator.clone(),
            self.capacity.clone(),
        );
        create_rest_app(context, AppConfig::default())
    }

    /// Prepare the store and serve until a shutdown signal arrives
    pub async fn start(self) -> Result<()> {
        self.prepare().await?;

        let addr = self.config.socket_addr()?;
        self.log_config_summary();

        let app = self.build_app();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        info!("Admin server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server shutdown complete");
        Ok(())
    }

    fn log_config_summary(&self) {
        info!("=== Admin Server Configuration ===");
        info!("Bind Address: {}:{}", self.config.bind_address, self.config.port);
        info!("Store Driver: {}", self.config.store_driver);
        info!("Key Path: {}", self.config.key_path.display());
        info!("Capacity Path: {}", self.config.capacity_path.display());
        info!(
            "Timeouts: {}s default, {}s bulk",
            self.config.request_timeout.as_secs(),
            self.config.bulk_timeout.as_secs()
        );
        info!("Configuration items: {}", self.manager.registry().all().len());
        info!("==================================");
    }
}

/// Resolve on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
