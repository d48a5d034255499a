// SPDX-License-Identifier: GPL-3.0-only

//! LVM CLI surface
//!
//! Inventory queries plus the snapshot lifecycle commands. The inventory is
//! the sole read-only gate consulted before any volume state is mutated;
//! everything else here changes host-wide device-mapper state and must go
//! through the caller's [`CommandRunner`].

use std::collections::BTreeSet;

use snapback_types::VolumeIdentity;

use crate::cmd::{CommandRunner, CommandSpec, run_checked};
use crate::error::{Result, SysError};

/// A point-in-time read of every volume-group/logical-volume pair known to
/// the volume manager.
///
/// Loaded once at run start; lookups afterwards are pure and reflect only
/// that read. Concurrent external changes are an accepted race, resolved by
/// the next run's preflight check.
#[derive(Debug, Clone, Default)]
pub struct VolumeInventory {
    volumes: BTreeSet<(String, String)>,
}

fn lvs_spec() -> CommandSpec {
    CommandSpec::new("lvs").args([
        "--noheadings",
        "-o",
        "vg_name,lv_name",
        "--separator",
        "\t",
    ])
}

impl VolumeInventory {
    /// Query the volume manager once and parse the result.
    pub fn load(runner: &dyn CommandRunner) -> Result<Self> {
        let spec = lvs_spec();
        let outcome = runner.run(&spec)?;
        if !outcome.success() {
            return Err(SysError::CommandFailed {
                command: spec.render(),
                code: outcome.code,
                stderr: outcome.stderr.trim().to_string(),
            });
        }

        let inventory = Self::parse(&outcome.stdout)?;
        tracing::debug!("inventory holds {} logical volumes", inventory.len());
        Ok(inventory)
    }

    /// Parse `lvs --noheadings -o vg_name,lv_name` output.
    ///
    /// A malformed non-empty line is an error, not a skip: a misread
    /// inventory must never let the preflight check wave a collision
    /// through.
    pub fn parse(output: &str) -> Result<Self> {
        let mut volumes = BTreeSet::new();

        for line in output.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut cols = line.split('\t').map(str::trim);
            match (cols.next(), cols.next()) {
                (Some(vg), Some(lv)) if !vg.is_empty() && !lv.is_empty() => {
                    volumes.insert((vg.to_string(), lv.to_string()));
                }
                _ => return Err(SysError::InvalidInventoryLine(line.to_string())),
            }
        }

        Ok(Self { volumes })
    }

    /// Pure lookup against the loaded snapshot of volume-manager state.
    pub fn has_volume(&self, volume: &VolumeIdentity) -> bool {
        self.volumes
            .contains(&(volume.group.clone(), volume.name.clone()))
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

fn create_snapshot_spec(source: &VolumeIdentity, snapshot: &VolumeIdentity) -> CommandSpec {
    CommandSpec::new("lvcreate")
        .arg("-s")
        .arg(source.text_name())
        .arg("-n")
        .arg(&snapshot.name)
}

/// Create a copy-on-write snapshot of `source` named after `snapshot`.
pub fn create_snapshot(
    runner: &dyn CommandRunner,
    source: &VolumeIdentity,
    snapshot: &VolumeIdentity,
) -> Result<()> {
    run_checked(runner, &create_snapshot_spec(source, snapshot))
}

fn activate_spec(volume: &VolumeIdentity) -> CommandSpec {
    // -K overrides the activation-skip flag snapshots carry by default.
    CommandSpec::new("lvchange")
        .args(["-ay", "-K"])
        .arg(volume.dm_path().display().to_string())
}

/// Make the snapshot volume accessible for reading.
pub fn activate(runner: &dyn CommandRunner, volume: &VolumeIdentity) -> Result<()> {
    run_checked(runner, &activate_spec(volume))
}

fn deactivate_spec(volume: &VolumeIdentity) -> CommandSpec {
    CommandSpec::new("lvchange")
        .arg("-an")
        .arg(volume.dm_path().display().to_string())
}

pub fn deactivate(runner: &dyn CommandRunner, volume: &VolumeIdentity) -> Result<()> {
    run_checked(runner, &deactivate_spec(volume))
}
