//! # Admin server REST API
//!
//! HTTP façade over the configuration manager:
//!
//! - `GET /api/configs` returns every value in its typed JSON form
//! - `PUT /api/configurations` applies a partial update
//! - `POST /api/configurations/reset` rebuilds from defaults and environment
//! - `GET /api/ping` answers `"Pong"`
//! - `GET /api/systeminfo/capacity` reports storage capacity
//!
//! All routes require the shared secret checked by the context's
//! authenticator.
//!
//! ## Example
//!
//! ```rust,no_run
//! use adminserver_rest_api::{create_rest_app, AppConfig, AppContext};
//!
//! # async fn example(context: AppContext) -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_rest_app(context, AppConfig::default());
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod capacity;
pub mod context;
pub mod errors;
pub mod handlers;

pub use app::{create_rest_app, AppConfig};
pub use capacity::{Capacity, CapacityError, CapacityProbe, StaticCapacity};
pub use context::AppContext;
pub use errors::{RestError, RestResult};
