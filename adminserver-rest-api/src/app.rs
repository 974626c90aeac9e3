//! Application configuration and router setup

use adminserver_web::{auth_middleware, request_id_middleware};
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{context::AppContext, handlers};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Enable request ID tracking
    pub enable_request_id: bool,
    /// Enable request tracing
    pub enable_tracing: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enable_request_id: true,
            enable_tracing: true,
        }
    }
}

/// Create the admin server router. Every API route sits behind the
/// authenticator held by `context`.
pub fn create_rest_app(context: AppContext, config: AppConfig) -> Router {
    let mut app = Router::new()
        .route("/api/configs", get(handlers::get_configs))
        .route("/api/configurations", put(handlers::update_configurations))
        .route(
            "/api/configurations/reset",
            post(handlers::reset_configurations),
        )
        .route("/api/ping", get(handlers::ping))
        .route("/api/systeminfo/capacity", get(handlers::capacity))
        .route_layer(middleware::from_fn_with_state(
            context.authenticator.clone(),
            auth_middleware,
        ))
        .with_state(context);

    if config.enable_tracing {
        app = app.layer(TraceLayer::new_for_http());
    }

    if config.enable_request_id {
        app = app.layer(middleware::from_fn(request_id_middleware));
    }

    app
}
