//! Storage capacity probe seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Size of the storage backing the registry, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub total: u64,
    pub free: u64,
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct CapacityError(pub String);

/// Reports the capacity served by `GET /api/systeminfo/capacity`
#[async_trait]
pub trait CapacityProbe: Send + Sync {
    async fn capacity(&self) -> Result<Capacity, CapacityError>;
}

/// Probe returning fixed numbers
#[derive(Debug, Clone, Copy)]
pub struct StaticCapacity(pub Capacity);

#[async_trait]
impl CapacityProbe for StaticCapacity {
    async fn capacity(&self) -> Result<Capacity, CapacityError> {
        Ok(self.0)
    }
}
