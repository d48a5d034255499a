// SPDX-License-Identifier: GPL-3.0-only

//! Backed-up filesystem declarations
//!
//! These models are deserialized from the host configuration file and never
//! mutated by the backup run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::volume::VolumeIdentity;

/// One filesystem to back up, as declared in host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesystemSpec {
    /// Volume group holding the source logical volume
    pub volume_group: String,

    /// Source logical volume name
    pub logical_volume: String,

    /// Where the live filesystem is mounted (e.g. "/", "/home")
    pub mount_point: PathBuf,
}

impl FilesystemSpec {
    /// Identity of the source volume this filesystem lives on.
    pub fn source_volume(&self) -> VolumeIdentity {
        VolumeIdentity::new(&self.volume_group, &self.logical_volume)
    }
}

/// Everything to back up for one host, plus where snapshots get mounted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostProfile {
    /// Parent directory under which per-filesystem snapshot mount points
    /// are created
    pub snapshot_root: PathBuf,

    /// Filesystems to back up, in configuration order
    pub filesystems: Vec<FilesystemSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_volume_uses_declared_names() {
        let fs = FilesystemSpec {
            volume_group: "vg0".to_string(),
            logical_volume: "root".to_string(),
            mount_point: PathBuf::from("/"),
        };
        assert_eq!(fs.source_volume(), VolumeIdentity::new("vg0", "root"));
    }
}
