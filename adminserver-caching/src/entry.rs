//! Cache entries

use std::time::Duration;
use tokio::time::Instant;

/// Cached value with expiry metadata
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value
    pub value: V,

    /// When the entry was created
    pub created_at: Instant,

    /// When the entry expires (if applicable)
    pub expires_at: Option<Instant>,

    /// Number of times accessed
    pub access_count: u64,
}

impl<V: Clone> CacheEntry<V> {
    /// Create a new cache entry
    pub fn new(value: V) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            expires_at: None,
            access_count: 0,
        }
    }

    /// Create a new cache entry with TTL
    pub fn with_ttl(value: V, ttl: Duration) -> Self {
        let mut entry = Self::new(value);
        entry.expires_at = Some(entry.created_at + ttl);
        entry
    }

    /// Check if the entry is expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Instant::now() >= expires_at,
            None => false,
        }
    }

    /// Record an access
    pub fn record_access(&mut self) {
        self.access_count += 1;
    }
}
