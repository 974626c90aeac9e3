//! Disk capacity probe backed by `sysinfo`

use adminserver_rest_api::{Capacity, CapacityError, CapacityProbe};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use sysinfo::Disks;
use tracing::debug;

/// Reports the size of the filesystem holding `path`
#[derive(Debug, Clone)]
pub struct DiskCapacityProbe {
    path: PathBuf,
}

impl DiskCapacityProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn measure(path: &Path) -> Result<Capacity, CapacityError> {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let disks = Disks::new_with_refreshed_list();
        let mounts = disks.list().iter().map(|disk| {
            (
                disk.mount_point(),
                Capacity {
                    total: disk.total_space(),
                    free: disk.available_space(),
                },
            )
        });

        let capacity = deepest_mount(mounts, &path).ok_or_else(|| {
            CapacityError(format!("no filesystem found for {}", path.display()))
        })?;
        debug!(path = %path.display(), total = capacity.total, free = capacity.free, "Measured capacity");
        Ok(capacity)
    }
}

#[async_trait]
impl CapacityProbe for DiskCapacityProbe {
    async fn capacity(&self) -> Result<Capacity, CapacityError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::measure(&path))
            .await
            .map_err(|e| CapacityError(format!("capacity probe failed: {}", e)))?
    }
}

/// Pick the entry whose mount point is the longest prefix of `path`
fn deepest_mount<'a, T>(
    mounts: impl Iterator<Item = (&'a Path, T)>,
    path: &Path,
) -> Option<T> {
    mounts
        .filter(|(mount, _)| path.starts_with(mount))
        .max_by_key(|(mount, _)| mount.components().count())
        .map(|(_, value)| value)
}
