//! Encoding of sensitive values on their way to and from storage

use crate::encryption::{CryptoError, Encryptor};
use crate::error::StorageResult;
use adminserver_core::MetadataRegistry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Encrypts and decrypts the values of a fixed set of sensitive keys.
///
/// The default key set is every Password-typed item of the registry. Both
/// the relational driver and [`EncryptedDriver`](crate::EncryptedDriver)
/// go through this type, so they always agree on which keys are sealed.
#[derive(Debug, Clone)]
pub struct SecretCodec {
    encryptor: Arc<Encryptor>,
    keys: HashSet<String>,
}

impl SecretCodec {
    /// Seal every Password-typed item known to `registry`
    pub fn new(encryptor: Arc<Encryptor>, registry: &MetadataRegistry) -> Self {
        Self::with_keys(encryptor, registry.password_keys())
    }

    pub fn with_keys(encryptor: Arc<Encryptor>, keys: HashSet<String>) -> Self {
        Self { encryptor, keys }
    }

    pub fn is_sensitive(&self, name: &str) -> bool {
        self.keys.contains(name)
    }

    pub fn keys(&self) -> &HashSet<String> {
        &self.keys
    }

    /// Prepare `value` for storage.
    ///
    /// `value` is always plaintext, even when it happens to start with the
    /// ciphertext marker, so every non-empty sensitive value is sealed.
    /// Without a key the value is written as plaintext.
    pub fn encode(&self, name: &str, value: String) -> StorageResult<String> {
        if !self.is_sensitive(name) || value.is_empty() {
            return Ok(value);
        }
        match self.encryptor.encrypt(&value) {
            Ok(sealed) => Ok(sealed),
            Err(CryptoError::KeyUnavailable(_)) => {
                debug!(key = %name, "No encryption key, storing value as plaintext");
                Ok(value)
            }
            Err(e) => {
                warn!(key = %name, "Failed to encrypt value: {}", e);
                Err(e.into())
            }
        }
    }

    /// Recover the plaintext of a stored value.
    ///
    /// Returns `None` when a sealed value cannot be decrypted; the caller drops
    /// the key. Plaintext values and sealed values without a key are returned
    /// untouched.
    pub fn decode(&self, name: &str, value: String) -> Option<String> {
        if !self.is_sensitive(name) || !Encryptor::is_encrypted(&value) {
            return Some(value);
        }
        match self.encryptor.decrypt(&value) {
            Ok(plain) => Some(plain),
            Err(CryptoError::KeyUnavailable(_)) => Some(value),
            Err(e) => {
                warn!(key = %name, "Dropping value that cannot be decrypted: {}", e);
                None
            }
        }
    }

    pub fn encode_map(&self, cfgs: HashMap<String, String>) -> StorageResult<HashMap<String, String>> {
        cfgs.into_iter()
            .map(|(name, value)| {
                let encoded = self.encode(&name, value)?;
                Ok((name, encoded))
            })
            .collect()
    }

    pub fn decode_map(&self, cfgs: HashMap<String, String>) -> HashMap<String, String> {
        cfgs.into_iter()
            .filter_map(|(name, value)| self.decode(&name, value).map(|plain| (name, plain)))
            .collect()
    }
}
