//! Driver decorator that seals sensitive values

use super::{ConfigDriver, RawConfig};
use crate::codec::SecretCodec;
use crate::error::StorageResult;
use async_trait::async_trait;

/// Encrypts the codec's keys before they reach `inner` and decrypts them on
/// the way back. Used in front of drivers that have no encryption of their
/// own, such as [`JsonFileDriver`](super::JsonFileDriver).
#[derive(Debug)]
pub struct EncryptedDriver<D> {
    inner: D,
    codec: SecretCodec,
}

impl<D: ConfigDriver> EncryptedDriver<D> {
    pub fn new(inner: D, codec: SecretCodec) -> Self {
        Self { inner, codec }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

#[async_trait]
impl<D: ConfigDriver> ConfigDriver for EncryptedDriver<D> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn load(&self) -> StorageResult<RawConfig> {
        let cfgs = self.inner.load().await?;
        Ok(self.codec.decode_map(cfgs))
    }

    async fn save(&self, cfgs: RawConfig) -> StorageResult<()> {
        let sealed = self.codec.encode_map(cfgs)?;
        self.inner.save(sealed).await
    }

    async fn replace(&self, cfgs: RawConfig) -> StorageResult<()> {
        let sealed = self.codec.encode_map(cfgs)?;
        self.inner.replace(sealed).await
    }
}
