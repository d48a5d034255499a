// SPDX-License-Identifier: GPL-3.0-only

//! Mounting and unmounting snapshot devices
//!
//! Mount-point directories are created through the privileged runner too,
//! so the whole acquire path is audited and honored under dry-run.

use std::path::Path;

use snapback_types::VolumeIdentity;

use crate::cmd::{CommandRunner, CommandSpec, run_checked};
use crate::error::Result;

fn mkdir_spec(dir: &Path) -> CommandSpec {
    CommandSpec::new("mkdir")
        .arg("-p")
        .arg(dir.display().to_string())
}

/// Create the mount-point directory if it does not exist yet.
pub fn ensure_mount_dir(runner: &dyn CommandRunner, dir: &Path) -> Result<()> {
    run_checked(runner, &mkdir_spec(dir))
}

fn mount_spec(volume: &VolumeIdentity, target: &Path, readonly: bool) -> CommandSpec {
    let mut spec = CommandSpec::new("mount");
    if readonly {
        spec = spec.arg("-r");
    }
    spec.arg(volume.dm_path().display().to_string())
        .arg(target.display().to_string())
}

/// Mount the volume's device node at `target`.
pub fn mount(
    runner: &dyn CommandRunner,
    volume: &VolumeIdentity,
    target: &Path,
    readonly: bool,
) -> Result<()> {
    run_checked(runner, &mount_spec(volume, target, readonly))
}

fn unmount_spec(volume: &VolumeIdentity) -> CommandSpec {
    CommandSpec::new("umount").arg(volume.dm_path().display().to_string())
}

/// Unmount by device node, mirroring how the mount was made.
pub fn unmount(runner: &dyn CommandRunner, volume: &VolumeIdentity) -> Result<()> {
    run_checked(runner, &unmount_spec(volume))
}
