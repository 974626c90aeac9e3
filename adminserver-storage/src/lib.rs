//! Storage layer for the admin server
//!
//! This crate owns everything between a typed configuration value and the
//! bytes on disk: the at-rest [`Encryptor`], the [`ConfigDriver`]
//! implementations (relational table, JSON file, in-memory map, remote
//! admin server, and the encrypting decorator) and the in-memory
//! [`ConfigStore`] that mediates between them.

pub mod codec;
pub mod drivers;
pub mod encryption;
pub mod error;
pub mod seaorm;
pub mod store;

pub use codec::SecretCodec;
pub use drivers::{
    ConfigDriver, DatabaseDriver, DriverOptions, EncryptedDriver, InMemoryDriver, JsonFileDriver,
    RawConfig, RestDriver,
};
pub use encryption::{CryptoError, Encryptor, FileKeyProvider, KeyProvider, DEFAULT_KEY_PATH};
pub use error::{StorageError, StorageResult};
pub use store::{ConfigStore, UpdateOutcome};
