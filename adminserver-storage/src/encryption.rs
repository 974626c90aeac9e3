//! At-rest encryption of sensitive configuration values
//!
//! Values are sealed with AES-256-GCM. The 256-bit key is the SHA-256 digest
//! of the key file contents, and every ciphertext is rendered as
//! `<enc-v1>` followed by base64 of `nonce || ciphertext || tag`. The marker
//! prefix lets callers tell sealed values from plaintext and prevents a value
//! from being encrypted twice.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Marker prepended to every ciphertext
pub const ENCRYPTED_PREFIX: &str = "<enc-v1>";

/// Key file used when `KEY_PATH` is not set
pub const DEFAULT_KEY_PATH: &str = "/etc/adminserver/key";

const NONCE_LEN: usize = 12;

/// Encryption errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The key file could not be read; the encryptor is in degraded mode
    #[error("Encryption key unavailable: {0}")]
    KeyUnavailable(String),

    #[error("Encryption failed: {0}")]
    Encrypt(String),

    #[error("Decryption failed: {0}")]
    Decrypt(String),
}

/// Source of the symmetric key material
pub trait KeyProvider: Send + Sync {
    fn key(&self) -> Result<Vec<u8>, CryptoError>;
}

/// Reads the key from a file
#[derive(Debug, Clone)]
pub struct FileKeyProvider {
    path: PathBuf,
}

impl FileKeyProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyProvider for FileKeyProvider {
    fn key(&self) -> Result<Vec<u8>, CryptoError> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            CryptoError::KeyUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let key = bytes.trim_ascii().to_vec();
        if key.is_empty() {
            return Err(CryptoError::KeyUnavailable(format!(
                "{}: key file is empty",
                self.path.display()
            )));
        }
        Ok(key)
    }
}

/// Symmetric encryptor for password-typed values
pub struct Encryptor {
    cipher: Result<Aes256Gcm, CryptoError>,
}

impl std::fmt::Debug for Encryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encryptor")
            .field("available", &self.is_available())
            .finish()
    }
}

impl Encryptor {
    /// Build an encryptor from `provider`.
    ///
    /// A provider failure does not fail construction: the encryptor enters
    /// degraded mode and every call returns [`CryptoError::KeyUnavailable`].
    pub fn new(provider: &dyn KeyProvider) -> Self {
        match provider.key() {
            Ok(key) => Self::from_key(&key),
            Err(e) => {
                warn!("Password encryption disabled: {}", e);
                Self { cipher: Err(e) }
            }
        }
    }

    pub fn from_key(key: &[u8]) -> Self {
        let digest = Sha256::digest(key);
        let cipher = Aes256Gcm::new_from_slice(&digest)
            .map_err(|e| CryptoError::KeyUnavailable(format!("invalid key length: {}", e)));
        Self { cipher }
    }

    /// An encryptor in degraded mode
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            cipher: Err(CryptoError::KeyUnavailable(reason.into())),
        }
    }

    pub fn is_available(&self) -> bool {
        self.cipher.is_ok()
    }

    /// Whether `value` carries the ciphertext marker
    pub fn is_encrypted(value: &str) -> bool {
        value.starts_with(ENCRYPTED_PREFIX)
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let cipher = self.cipher()?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::Encrypt(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(format!(
            "{}{}",
            ENCRYPTED_PREFIX,
            base64::engine::general_purpose::STANDARD.encode(sealed)
        ))
    }

    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        let cipher = self.cipher()?;

        let encoded = ciphertext
            .strip_prefix(ENCRYPTED_PREFIX)
            .ok_or_else(|| CryptoError::Decrypt("missing ciphertext marker".to_string()))?;
        let sealed = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::Decrypt(format!("invalid base64: {}", e)))?;
        if sealed.len() < NONCE_LEN {
            return Err(CryptoError::Decrypt("ciphertext too short".to_string()));
        }

        let (nonce, body) = sealed.split_at(NONCE_LEN);
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), body)
            .map_err(|e| CryptoError::Decrypt(e.to_string()))?;

        String::from_utf8(plaintext).map_err(|e| CryptoError::Decrypt(e.to_string()))
    }

    fn cipher(&self) -> Result<&Aes256Gcm, CryptoError> {
        self.cipher.as_ref().map_err(Clone::clone)
    }
}

static GLOBAL_ENCRYPTOR: OnceCell<Arc<Encryptor>> = OnceCell::new();

/// Initialize the process-wide encryptor from `key_path`.
///
/// Only the first call reads the key; later calls return the same instance.
pub fn init_global(key_path: &Path) -> Arc<Encryptor> {
    GLOBAL_ENCRYPTOR
        .get_or_init(|| {
            debug!("Loading encryption key from {}", key_path.display());
            Arc::new(Encryptor::new(&FileKeyProvider::new(key_path)))
        })
        .clone()
}
