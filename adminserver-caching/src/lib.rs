//! Caching for configuration drivers
//!
//! [`CachedDriver`] keeps the last map returned by a driver for as long as
//! the map's own `cfg_cache_interval_seconds` says, so services that read
//! their configuration from a remote admin server do not fetch it on every
//! lookup.

pub mod driver;
pub mod entry;
pub mod stats;

pub use driver::CachedDriver;
pub use entry::CacheEntry;
pub use stats::{CacheStats, StatsCollector};
