//! Shared state handed to the handlers

use adminserver_config::ConfigManager;
use adminserver_web::Authenticator;
use std::sync::Arc;

use crate::capacity::CapacityProbe;

/// Dependencies of the REST handlers
#[derive(Clone)]
pub struct AppContext {
    pub manager: Arc<ConfigManager>,
    pub authenticator: Arc<dyn Authenticator>,
    pub capacity: Arc<dyn CapacityProbe>,
}

impl AppContext {
    pub fn new(
        manager: Arc<ConfigManager>,
        authenticator: Arc<dyn Authenticator>,
        capacity: Arc<dyn CapacityProbe>,
    ) -> Self {
        Self {
            manager,
            authenticator,
            capacity,
        }
    }
}
