pub mod configs;
pub mod system;

pub use configs::{get_configs, reset_configurations, update_configurations};
pub use system::{capacity, ping};
