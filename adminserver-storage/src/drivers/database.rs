//! Relational driver

use super::{loadable, persistable, ConfigDriver, DriverOptions, RawConfig};
use crate::codec::SecretCodec;
use crate::error::{StorageError, StorageResult};
use crate::seaorm::entities::properties;
use crate::seaorm::DatabaseConnection;
use adminserver_core::MetadataRegistry;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, EntityTrait, TransactionTrait};
use std::sync::Arc;
use tracing::debug;

/// Stores configuration rows in the `properties` table.
///
/// Password items are sealed through the codec before they are written and
/// opened again on load. A save writes every row in one transaction.
#[derive(Debug, Clone)]
pub struct DatabaseDriver {
    db: DatabaseConnection,
    codec: SecretCodec,
    registry: Arc<MetadataRegistry>,
    options: DriverOptions,
}

impl DatabaseDriver {
    pub fn new(
        db: DatabaseConnection,
        codec: SecretCodec,
        registry: Arc<MetadataRegistry>,
        options: DriverOptions,
    ) -> Self {
        Self {
            db,
            codec,
            registry,
            options,
        }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Rows exactly as stored, without filtering or decryption
    pub async fn raw_rows(&self) -> StorageResult<RawConfig> {
        let rows = properties::Entity::find()
            .all(self.db.get_connection())
            .await?;
        Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
    }

    fn prepare(&self, cfgs: RawConfig) -> StorageResult<Vec<properties::ActiveModel>> {
        let cfgs = persistable(&self.registry, cfgs, self.options);
        let sealed = self.codec.encode_map(cfgs)?;
        let now = Utc::now();
        Ok(sealed
            .into_iter()
            .map(|(key, value)| properties::ActiveModel {
                key: Set(key),
                value: Set(value),
                created_at: Set(now),
                modified_at: Set(now),
            })
            .collect())
    }
}

#[async_trait]
impl ConfigDriver for DatabaseDriver {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn load(&self) -> StorageResult<RawConfig> {
        let rows = self.raw_rows().await?;
        let total = rows.len();
        let cfgs = self.codec.decode_map(loadable(&self.registry, rows));
        debug!("Loaded {} of {} configuration rows", cfgs.len(), total);
        Ok(cfgs)
    }

    async fn save(&self, cfgs: RawConfig) -> StorageResult<()> {
        let models = self.prepare(cfgs)?;
        if models.is_empty() {
            return Ok(());
        }
        let count = models.len();

        let txn = self
            .db
            .get_connection()
            .begin()
            .await
            .map_err(|e| StorageError::TransactionFailed(e.to_string()))?;
        for model in models {
            properties::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(properties::Column::Key)
                        .update_columns([properties::Column::Value, properties::Column::ModifiedAt])
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit()
            .await
            .map_err(|e| StorageError::TransactionFailed(e.to_string()))?;

        debug!("Saved {} configuration rows", count);
        Ok(())
    }

    async fn replace(&self, cfgs: RawConfig) -> StorageResult<()> {
        let models = self.prepare(cfgs)?;
        let count = models.len();

        let txn = self
            .db
            .get_connection()
            .begin()
            .await
            .map_err(|e| StorageError::TransactionFailed(e.to_string()))?;
        properties::Entity::delete_many().exec(&txn).await?;
        if !models.is_empty() {
            properties::Entity::insert_many(models)
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit()
            .await
            .map_err(|e| StorageError::TransactionFailed(e.to_string()))?;

        debug!("Replaced configuration table with {} rows", count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::Encryptor;
    use crate::seaorm::DatabaseConfig;
    use adminserver_core::items::default_items;
    use std::collections::HashMap;

    async fn driver(options: DriverOptions) -> (DatabaseDriver, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("config.db").display());
        let db = DatabaseConnection::new(DatabaseConfig::new(url)).await.unwrap();
        db.migrate().await.unwrap();

        let registry = Arc::new(MetadataRegistry::with_items(default_items()));
        let codec = SecretCodec::new(Arc::new(Encryptor::from_key(b"test-key")), &registry);
        (DatabaseDriver::new(db, codec, registry, options), dir)
    }

    #[tokio::test]
    async fn test_passwords_are_encrypted_at_rest() {
        let (driver, _dir) = driver(DriverOptions::default()).await;
        driver
            .save(HashMap::from([
                ("email_password".to_string(), "s3cr3t".to_string()),
                ("ldap_url".to_string(), "ldap://x".to_string()),
            ]))
            .await
            .unwrap();

        let raw = driver.raw_rows().await.unwrap();
        assert_ne!(raw["email_password"], "s3cr3t");
        assert!(Encryptor::is_encrypted(&raw["email_password"]));
        assert_eq!(raw["ldap_url"], "ldap://x");

        let loaded = driver.load().await.unwrap();
        assert_eq!(loaded["email_password"], "s3cr3t");
    }

    #[tokio::test]
    async fn test_save_upserts_existing_rows() {
        let (driver, _dir) = driver(DriverOptions::default()).await;
        driver
            .save(HashMap::from([("ldap_timeout".to_string(), "5".to_string())]))
            .await
            .unwrap();
        driver
            .save(HashMap::from([("ldap_timeout".to_string(), "10".to_string())]))
            .await
            .unwrap();
        let loaded = driver.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["ldap_timeout"], "10");
    }

    #[tokio::test]
    async fn test_system_scope_is_not_persisted() {
        let (driver, _dir) = driver(DriverOptions::default()).await;
        driver
            .save(HashMap::from([
                ("core_url".to_string(), "http://core".to_string()),
                ("not_a_key".to_string(), "x".to_string()),
            ]))
            .await
            .unwrap();
        assert!(driver.raw_rows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_test_mode_persists_system_scope_but_load_skips_it() {
        let (driver, _dir) = driver(DriverOptions::test_mode()).await;
        driver
            .save(HashMap::from([("core_url".to_string(), "http://core".to_string())]))
            .await
            .unwrap();
        assert_eq!(driver.raw_rows().await.unwrap().len(), 1);
        assert!(driver.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_drops_stale_rows() {
        let (driver, _dir) = driver(DriverOptions::default()).await;
        driver
            .save(HashMap::from([
                ("ldap_url".to_string(), "ldap://a".to_string()),
                ("ldap_filter".to_string(), "(objectClass=person)".to_string()),
            ]))
            .await
            .unwrap();
        driver
            .replace(HashMap::from([("ldap_url".to_string(), "ldap://b".to_string())]))
            .await
            .unwrap();

        let loaded = driver.load().await.unwrap();
        assert_eq!(loaded, HashMap::from([("ldap_url".to_string(), "ldap://b".to_string())]));
    }

    #[tokio::test]
    async fn test_undecryptable_rows_are_dropped() {
        let (driver, _dir) = driver(DriverOptions::default()).await;
        let now = Utc::now();
        let foreign = Encryptor::from_key(b"other-key").encrypt("s3cr3t").unwrap();
        for (key, value) in [("email_password", foreign), ("email_host", "smtp.example.com".to_string())] {
            properties::Entity::insert(properties::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value),
                created_at: Set(now),
                modified_at: Set(now),
            })
            .exec_without_returning(driver.connection().get_connection())
            .await
            .unwrap();
        }

        let loaded = driver.load().await.unwrap();
        assert!(!loaded.contains_key("email_password"));
        assert_eq!(loaded["email_host"], "smtp.example.com");
    }

    #[tokio::test]
    async fn test_password_with_marker_prefix_survives_reload() {
        let (driver, _dir) = driver(DriverOptions::default()).await;
        driver
            .save(HashMap::from([(
                "email_password".to_string(),
                "<enc-v1>hunter2".to_string(),
            )]))
            .await
            .unwrap();

        let raw = driver.raw_rows().await.unwrap();
        assert_ne!(raw["email_password"], "<enc-v1>hunter2");

        let loaded = driver.load().await.unwrap();
        assert_eq!(
            loaded.get("email_password").map(String::as_str),
            Some("<enc-v1>hunter2")
        );
    }
}
