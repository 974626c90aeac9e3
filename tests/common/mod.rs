//! Shared fixtures for the admin server integration tests

use adminserver_config::{ConfigManager, Environment};
use adminserver_core::items::default_items;
use adminserver_core::MetadataRegistry;
use adminserver_rest_api::{create_rest_app, AppConfig, AppContext, Capacity, StaticCapacity};
use adminserver_storage::{DriverOptions, InMemoryDriver};
use adminserver_web::SecretAuthenticator;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::Router;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;

pub const SECRET: &str = "ui-secret";

pub fn registry() -> Arc<MetadataRegistry> {
    Arc::new(MetadataRegistry::with_items(default_items()))
}

/// Local manager over a fresh in-memory driver
pub fn memory_manager(env: Environment) -> (Arc<ConfigManager>, Arc<InMemoryDriver>) {
    let driver = Arc::new(InMemoryDriver::new());
    let manager = ConfigManager::local(registry(), driver.clone(), env, DriverOptions::default());
    (Arc::new(manager), driver)
}

pub fn app(manager: Arc<ConfigManager>) -> Router {
    let context = AppContext::new(
        manager,
        Arc::new(SecretAuthenticator::new([SECRET])),
        Arc::new(StaticCapacity(Capacity {
            total: 1000,
            free: 250,
        })),
    );
    create_rest_app(context, AppConfig::default())
}

/// Request carrying the shared secret cookie
pub fn request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, format!("secret={}", SECRET))
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Serve `manager` on an ephemeral local port
pub async fn spawn_server(manager: Arc<ConfigManager>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app(manager);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
