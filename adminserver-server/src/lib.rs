//! Admin server process
//!
//! Wires the configuration loaded by [`adminserver_config::ConfigLoader`]
//! into a running service: the persistence driver selected by
//! `CFG_STORE_DRIVER`, the configuration manager, the REST router and the
//! listener with graceful shutdown. [`remote_manager`] builds the client
//! side used by services that read their configuration from a running
//! admin server.

pub mod capacity;
pub mod logging;
pub mod startup;

pub use capacity::DiskCapacityProbe;
pub use logging::init_logging;
pub use startup::{build_driver, remote_manager, shutdown_signal, Server};
