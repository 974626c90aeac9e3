//! Sea-ORM backed relational storage

pub mod config;
pub mod connection;
pub mod entities;
pub mod migrations;

pub use config::DatabaseConfig;
pub use connection::{DatabaseConnection, DatabaseError};
