//! Core configuration model for the admin server
//!
//! This crate holds the metadata registry (the fixed table of known
//! configuration items), the item types with their validation and parsing
//! rules, and the typed value wrapper every other crate stores and reads.
//! It has minimal dependencies and defines the vocabulary shared by the
//! storage, manager and HTTP layers.

pub mod error;
pub mod items;
pub mod metadata;
pub mod types;
pub mod value;

// Re-export commonly used types at the crate root
pub use error::{CoreError, CoreResult};
pub use metadata::{registry, MetadataItem, MetadataRegistry};
pub use types::{group, json_to_raw, AuthMode, ItemType, Scope};
pub use value::TypedValue;
