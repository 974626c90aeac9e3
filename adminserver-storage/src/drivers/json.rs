//! JSON file driver

use super::{loadable, persistable, ConfigDriver, DriverOptions, RawConfig};
use crate::error::{StorageError, StorageResult};
use adminserver_core::{json_to_raw, MetadataRegistry};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Default location of the JSON store
pub const DEFAULT_JSON_STORE_PATH: &str = "/etc/adminserver/config/config.json";

/// Stores the configuration as a single JSON object in a file.
///
/// Writes are read-modify-write under a process-local lock and land through
/// a temporary file that is renamed over the target, so readers only ever
/// see a complete file.
#[derive(Debug)]
pub struct JsonFileDriver {
    path: PathBuf,
    lock: RwLock<()>,
    registry: Arc<MetadataRegistry>,
    options: DriverOptions,
}

impl JsonFileDriver {
    pub fn new(
        path: impl Into<PathBuf>,
        registry: Arc<MetadataRegistry>,
        options: DriverOptions,
    ) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
            registry,
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> StorageResult<RawConfig> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("JSON store {} does not exist yet", self.path.display());
                return Ok(RawConfig::new());
            }
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(RawConfig::new());
        }

        let object: Map<String, Value> = serde_json::from_str(&content).map_err(|e| {
            StorageError::ConfigError(format!(
                "{} is not a JSON object: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(object
            .iter()
            .map(|(name, value)| (name.clone(), json_to_raw(value)))
            .collect())
    }

    async fn write_file(&self, cfgs: &RawConfig) -> StorageResult<()> {
        let mut ordered: Vec<(&String, &String)> = cfgs.iter().collect();
        ordered.sort();
        let object: Map<String, Value> = ordered
            .into_iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        let content = serde_json::to_vec_pretty(&object)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                info!("Creating JSON store directory: {}", parent.display());
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.temp_path();
        // The mode only applies on creation, so a leftover temp file must go
        match tokio::fs::remove_file(&tmp).await {
            Ok(()) => debug!("Removed stale temp file {}", tmp.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut file = owner_only_options().open(&tmp).await?;
        file.write_all(&content).await?;
        file.sync_all().await?;
        drop(file);

        if let Ok(existing) = tokio::fs::metadata(&self.path).await {
            tokio::fs::set_permissions(&tmp, existing.permissions()).await?;
        }
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!("Wrote {} keys to {}", cfgs.len(), self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "config.json".to_string());
        self.path.with_file_name(format!(".{}.tmp", file_name))
    }
}

/// Create-new options; on unix the file starts out as 0600
fn owner_only_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);
    options
}

#[async_trait]
impl ConfigDriver for JsonFileDriver {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn load(&self) -> StorageResult<RawConfig> {
        let _guard = self.lock.read().await;
        let cfgs = self.read_file().await?;
        Ok(loadable(&self.registry, cfgs))
    }

    async fn save(&self, cfgs: RawConfig) -> StorageResult<()> {
        let cfgs = persistable(&self.registry, cfgs, self.options);
        let _guard = self.lock.write().await;
        let mut current = self.read_file().await?;
        current.extend(cfgs);
        self.write_file(&current).await
    }

    async fn replace(&self, cfgs: RawConfig) -> StorageResult<()> {
        let cfgs = persistable(&self.registry, cfgs, self.options);
        let _guard = self.lock.write().await;
        self.write_file(&cfgs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adminserver_core::items::default_items;
    use std::collections::HashMap;

    fn driver(path: &Path) -> JsonFileDriver {
        JsonFileDriver::new(
            path,
            Arc::new(MetadataRegistry::with_items(default_items())),
            DriverOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_missing_and_empty_files_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert!(driver(&path).load().await.unwrap().is_empty());

        std::fs::write(&path, "").unwrap();
        assert!(driver(&path).load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_merges_and_skips_system_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let driver = driver(&path);

        driver
            .save(HashMap::from([
                ("ldap_url".to_string(), "ldap://x".to_string()),
                ("core_url".to_string(), "http://core".to_string()),
            ]))
            .await
            .unwrap();
        driver
            .save(HashMap::from([("ldap_timeout".to_string(), "10".to_string())]))
            .await
            .unwrap();

        let loaded = driver.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded["ldap_url"], "ldap://x");
        assert_eq!(loaded["ldap_timeout"], "10");

        let on_disk: Map<String, Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(!on_disk.contains_key("core_url"));
    }

    #[tokio::test]
    async fn test_replace_discards_previous_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let driver = driver(&path);

        driver
            .save(HashMap::from([("ldap_url".to_string(), "ldap://x".to_string())]))
            .await
            .unwrap();
        driver
            .replace(HashMap::from([("ldap_timeout".to_string(), "3".to_string())]))
            .await
            .unwrap();

        let loaded = driver.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["ldap_timeout"], "3");
    }

    #[tokio::test]
    async fn test_typed_json_values_are_read_as_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"ldap_timeout": 7, "ldap_verify_cert": false}"#).unwrap();

        let loaded = driver(&path).load().await.unwrap();
        assert_eq!(loaded["ldap_timeout"], "7");
        assert_eq!(loaded["ldap_verify_cert"], "false");
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            driver(&path).load().await,
            Err(StorageError::ConfigError(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_new_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        driver(&path)
            .save(HashMap::from([("ldap_url".to_string(), "ldap://x".to_string())]))
            .await
            .unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stale_temp_file_does_not_leak_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let driver = driver(&path);
        let tmp = driver.temp_path();
        std::fs::write(&tmp, "partial").unwrap();
        std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o666)).unwrap();

        driver
            .save(HashMap::from([("ldap_url".to_string(), "ldap://x".to_string())]))
            .await
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!tmp.exists());
        assert_eq!(driver.load().await.unwrap()["ldap_url"], "ldap://x");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_existing_file_mode_is_preserved() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        driver(&path)
            .save(HashMap::from([("ldap_timeout".to_string(), "4".to_string())]))
            .await
            .unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_and_loads_see_whole_maps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let driver = Arc::new(driver(&path));

        let written: Vec<RawConfig> = (0..8)
            .map(|i| {
                HashMap::from([
                    ("ldap_url".to_string(), format!("ldap://{}", i)),
                    ("ldap_timeout".to_string(), i.to_string()),
                    ("email_host".to_string(), format!("smtp{}.example.com", i)),
                ])
            })
            .collect();
        driver.save(written[0].clone()).await.unwrap();

        let mut tasks = Vec::new();
        for cfgs in written.iter().cloned() {
            let driver = driver.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..10 {
                    driver.save(cfgs.clone()).await.unwrap();
                }
            }));
        }
        let mut readers = Vec::new();
        for _ in 0..4 {
            let driver = driver.clone();
            let written = written.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..40 {
                    let loaded = driver.load().await.unwrap();
                    assert!(
                        written.contains(&loaded),
                        "load returned a mixed map: {:?}",
                        loaded
                    );
                }
            }));
        }

        for task in tasks.into_iter().chain(readers) {
            task.await.unwrap();
        }
        let last = driver.load().await.unwrap();
        assert!(written.contains(&last));
        let on_disk: Map<String, Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), 3);
    }
}
