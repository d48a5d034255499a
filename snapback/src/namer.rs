// SPDX-License-Identifier: GPL-3.0-only

//! Snapshot naming
//!
//! The backup date is captured once when the run starts and reused for
//! every snapshot name, so a run spanning midnight still produces one
//! coherent set of names.

use chrono::Local;
use snapback_types::{FilesystemSpec, VolumeIdentity};

/// Derives every snapshot identity for one backup run.
#[derive(Debug, Clone)]
pub struct Namer {
    timestamp: String,
}

impl Namer {
    /// Capture today's date for the whole run.
    pub fn new() -> Self {
        Self::with_timestamp(Local::now().format("%Y.%m.%d").to_string())
    }

    pub fn with_timestamp(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Identity of the snapshot volume for this filesystem: same volume
    /// group, logical volume named `<source_lv>.<timestamp>`.
    pub fn snapshot_volume(&self, fs: &FilesystemSpec) -> VolumeIdentity {
        VolumeIdentity::new(
            &fs.volume_group,
            format!("{}.{}", fs.logical_volume, self.timestamp),
        )
    }
}

impl Default for Namer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fs() -> FilesystemSpec {
        FilesystemSpec {
            volume_group: "vg0".to_string(),
            logical_volume: "root".to_string(),
            mount_point: PathBuf::from("/"),
        }
    }

    #[test]
    fn derives_snapshot_identity() {
        let namer = Namer::with_timestamp("2024.01.15");
        let snapshot = namer.snapshot_volume(&fs());
        assert_eq!(snapshot, VolumeIdentity::new("vg0", "root.2024.01.15"));
    }

    #[test]
    fn naming_is_deterministic_within_a_run() {
        let namer = Namer::with_timestamp("2024.01.15");
        assert_eq!(namer.snapshot_volume(&fs()), namer.snapshot_volume(&fs()));
    }

    #[test]
    fn todays_date_uses_dotted_format() {
        let namer = Namer::new();
        // YYYY.MM.DD
        assert_eq!(namer.timestamp().len(), 10);
        assert_eq!(namer.timestamp().matches('.').count(), 2);
    }
}
