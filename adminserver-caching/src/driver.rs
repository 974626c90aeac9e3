//! TTL-cached driver

use crate::entry::CacheEntry;
use crate::stats::{CacheStats, StatsCollector};
use adminserver_core::items::CFG_CACHE_INTERVAL_SECONDS;
use adminserver_storage::{ConfigDriver, RawConfig, StorageResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::time::Duration;
use tracing::debug;

/// Wraps a driver with a single cached map.
///
/// The TTL comes from the `cfg_cache_interval_seconds` value of the map the
/// driver returned; zero, negative or missing values disable caching and
/// every load goes through.
#[derive(Debug)]
pub struct CachedDriver<D> {
    inner: D,
    entry: RwLock<Option<CacheEntry<RawConfig>>>,
    stats: StatsCollector,
}

impl<D: ConfigDriver> CachedDriver<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            entry: RwLock::new(None),
            stats: StatsCollector::new(),
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Drop the cached map so the next load goes to the driver
    pub fn invalidate(&self) {
        if self.entry.write().take().is_some() {
            self.stats.record_invalidation();
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Whether an unexpired map is cached
    pub fn is_cached(&self) -> bool {
        self.entry
            .read()
            .as_ref()
            .is_some_and(|entry| !entry.is_expired())
    }

    fn cached(&self) -> Option<RawConfig> {
        let mut guard = self.entry.write();
        match guard.as_mut() {
            Some(entry) if !entry.is_expired() => {
                entry.record_access();
                Some(entry.value.clone())
            }
            _ => None,
        }
    }

    fn store(&self, cfgs: &RawConfig) {
        let mut guard = self.entry.write();
        match cache_ttl(cfgs) {
            Some(ttl) => {
                *guard = Some(CacheEntry::with_ttl(cfgs.clone(), ttl));
                self.stats.record_refresh();
                debug!("Cached configuration for {}s", ttl.as_secs());
            }
            None => *guard = None,
        }
    }
}

/// TTL configured by a loaded map
fn cache_ttl(cfgs: &RawConfig) -> Option<Duration> {
    cfgs.get(CFG_CACHE_INTERVAL_SECONDS)
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|seconds| *seconds > 0)
        .map(|seconds| Duration::from_secs(seconds as u64))
}

#[async_trait]
impl<D: ConfigDriver> ConfigDriver for CachedDriver<D> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn load(&self) -> StorageResult<RawConfig> {
        if let Some(cfgs) = self.cached() {
            self.stats.record_hit();
            return Ok(cfgs);
        }
        self.stats.record_miss();

        let cfgs = self.inner.load().await?;
        self.store(&cfgs);
        Ok(cfgs)
    }

    async fn save(&self, cfgs: RawConfig) -> StorageResult<()> {
        self.inner.save(cfgs.clone()).await?;

        let merged = {
            let guard = self.entry.read();
            match guard.as_ref() {
                Some(entry) if !entry.is_expired() => {
                    let mut merged = entry.value.clone();
                    merged.extend(cfgs);
                    Some(merged)
                }
                _ => None,
            }
        };
        if let Some(merged) = merged {
            self.store(&merged);
        }
        Ok(())
    }

    async fn replace(&self, cfgs: RawConfig) -> StorageResult<()> {
        self.inner.replace(cfgs).await?;
        self.invalidate();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adminserver_storage::InMemoryDriver;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn entries(interval: &str) -> RawConfig {
        HashMap::from([
            (CFG_CACHE_INTERVAL_SECONDS.to_string(), interval.to_string()),
            ("ldap_url".to_string(), "ldap://a".to_string()),
        ])
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_is_cached_until_ttl_expires() {
        let inner = Arc::new(InMemoryDriver::with_entries(entries("30")));
        let driver = CachedDriver::new(inner.clone());

        assert_eq!(driver.load().await.unwrap()["ldap_url"], "ldap://a");
        inner
            .save(HashMap::from([("ldap_url".to_string(), "ldap://b".to_string())]))
            .await
            .unwrap();

        // Still served from the cache
        assert_eq!(driver.load().await.unwrap()["ldap_url"], "ldap://a");
        assert_eq!(driver.stats().hits, 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(driver.load().await.unwrap()["ldap_url"], "ldap://b");
        assert_eq!(driver.stats().misses, 2);
    }

    #[tokio::test]
    async fn test_zero_negative_or_missing_interval_disables_cache() {
        for cfgs in [entries("0"), entries("-5"), HashMap::new()] {
            let driver = CachedDriver::new(InMemoryDriver::with_entries(cfgs));
            driver.load().await.unwrap();
            assert!(!driver.is_cached());
            driver.load().await.unwrap();
            assert_eq!(driver.stats().hits, 0);
        }
    }

    #[tokio::test]
    async fn test_save_writes_through_and_refreshes() {
        let inner = Arc::new(InMemoryDriver::with_entries(entries("60")));
        let driver = CachedDriver::new(inner.clone());
        driver.load().await.unwrap();

        driver
            .save(HashMap::from([("ldap_url".to_string(), "ldap://c".to_string())]))
            .await
            .unwrap();

        assert_eq!(inner.snapshot()["ldap_url"], "ldap://c");
        assert_eq!(driver.load().await.unwrap()["ldap_url"], "ldap://c");
        assert_eq!(driver.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_replace_and_invalidate_drop_the_cache() {
        let driver = CachedDriver::new(InMemoryDriver::with_entries(entries("60")));
        driver.load().await.unwrap();
        assert!(driver.is_cached());

        driver.replace(entries("60")).await.unwrap();
        assert!(!driver.is_cached());

        driver.load().await.unwrap();
        driver.invalidate();
        assert!(!driver.is_cached());
        assert_eq!(driver.stats().invalidations, 2);
    }
}
