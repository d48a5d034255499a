// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use snapback_sys::SysError;
use snapback_types::VolumeIdentity;
use thiserror::Error;

/// Run-level failures, one variant per orchestration step.
///
/// Preflight and snapshot-creation failures abort the whole run; the
/// per-filesystem variants abort only the cycle they occurred in.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("unable to read volume inventory: {source}")]
    Inventory {
        #[source]
        source: SysError,
    },

    #[error("snapshot volume {volume} already exists; remove it before rerunning")]
    Collision { volume: VolumeIdentity },

    #[error("creating snapshot {volume} failed: {source}")]
    Creation {
        volume: VolumeIdentity,
        #[source]
        source: SysError,
    },

    #[error("activating {volume} failed: {source}")]
    Activation {
        volume: VolumeIdentity,
        #[source]
        source: SysError,
    },

    #[error("integrity check of {volume} failed{}", status.map(|code| format!(" with status {code}")).unwrap_or_default())]
    IntegrityCheck {
        volume: VolumeIdentity,
        /// Exit status when the check ran but reported damage; `None` when
        /// the check itself could not run
        status: Option<i32>,
        #[source]
        source: Option<SysError>,
    },

    #[error("mounting {volume} at {} failed: {source}", mount_point.display())]
    Mount {
        volume: VolumeIdentity,
        mount_point: PathBuf,
        #[source]
        source: SysError,
    },

    #[error("integrity scan under {} failed: {source}", mount_point.display())]
    Scan {
        mount_point: PathBuf,
        #[source]
        source: SysError,
    },

    #[error("unmounting {volume} failed: {source}")]
    Unmount {
        volume: VolumeIdentity,
        #[source]
        source: SysError,
    },

    #[error("deactivating {volume} failed: {source}")]
    Deactivation {
        volume: VolumeIdentity,
        #[source]
        source: SysError,
    },
}

pub type Result<T> = std::result::Result<T, BackupError>;
