// SPDX-License-Identifier: GPL-3.0-only

//! The snapshot-orchestration state machine
//!
//! One run is: preflight (read-only collision check) → snapshot creation →
//! a strictly sequential per-filesystem cycle of
//! activate → check → mount → scan → unmount → deactivate.
//!
//! The release steps pair with their acquire steps in reverse order and run
//! on every exit path of the cycle, so a failed scan never leaves a volume
//! mounted or activated. Release failures are logged and never mask the
//! failure that triggered them.

use snapback_sys::{CheckOutcome, CommandRunner, VolumeInventory, fsck, lvm, mount};
use snapback_types::{FilesystemSpec, HostProfile, VolumeIdentity};

use crate::error::{BackupError, Result};
use crate::namer::Namer;
use crate::scan::Scanner;

/// One backup run: a host profile, a run-scoped namer, a point-in-time
/// volume inventory, and the command runner everything is executed through.
pub struct Backup<'a> {
    profile: &'a HostProfile,
    namer: &'a Namer,
    inventory: VolumeInventory,
    runner: &'a dyn CommandRunner,
    scanner: &'a Scanner,
}

impl<'a> Backup<'a> {
    pub fn new(
        profile: &'a HostProfile,
        namer: &'a Namer,
        inventory: VolumeInventory,
        runner: &'a dyn CommandRunner,
        scanner: &'a Scanner,
    ) -> Self {
        Self {
            profile,
            namer,
            inventory,
            runner,
            scanner,
        }
    }

    pub fn run(&self) -> Result<()> {
        self.preflight()?;
        self.create_snapshots()?;
        self.backup_filesystems()
    }

    /// All-or-nothing pre-check: refuse the whole run before any mutation
    /// if any of today's snapshot names already exists.
    fn preflight(&self) -> Result<()> {
        for fs in &self.profile.filesystems {
            let snapshot = self.namer.snapshot_volume(fs);
            if self.inventory.has_volume(&snapshot) {
                return Err(BackupError::Collision { volume: snapshot });
            }
        }
        Ok(())
    }

    /// Create every snapshot in configuration order. A failure partway
    /// aborts the run; snapshots already created stay in place for the
    /// operator to reconcile.
    fn create_snapshots(&self) -> Result<()> {
        let mut created: Vec<VolumeIdentity> = Vec::new();

        for fs in &self.profile.filesystems {
            let snapshot = self.namer.snapshot_volume(fs);
            if let Err(source) = lvm::create_snapshot(self.runner, &fs.source_volume(), &snapshot) {
                if !created.is_empty() {
                    let names: Vec<String> = created.iter().map(ToString::to_string).collect();
                    tracing::error!(
                        "snapshot creation failed partway; already created and left in place: {}",
                        names.join(", ")
                    );
                }
                return Err(BackupError::Creation {
                    volume: snapshot,
                    source,
                });
            }
            created.push(snapshot);
        }

        Ok(())
    }

    /// Run every filesystem's cycle even when earlier ones failed; the
    /// run's result is the first hard failure.
    fn backup_filesystems(&self) -> Result<()> {
        let mut first_failure = None;

        for fs in &self.profile.filesystems {
            match self.backup_one(fs) {
                Ok(()) => tracing::info!("backed up {}", fs.source_volume()),
                Err(error) => {
                    tracing::error!("backup of {} failed: {error}", fs.source_volume());
                    first_failure.get_or_insert(error);
                }
            }
        }

        match first_failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn backup_one(&self, fs: &FilesystemSpec) -> Result<()> {
        let snapshot = self.namer.snapshot_volume(fs);
        tracing::info!("scanning {} via snapshot {snapshot}", fs.source_volume());

        lvm::activate(self.runner, &snapshot).map_err(|source| BackupError::Activation {
            volume: snapshot.clone(),
            source,
        })?;

        let result = self.check_mount_and_scan(fs, &snapshot);

        // Pairs with the activation above on every exit path.
        match (result, lvm::deactivate(self.runner, &snapshot)) {
            (Err(primary), Err(release)) => {
                tracing::warn!("deactivating {snapshot} also failed: {release}");
                Err(primary)
            }
            (Err(primary), Ok(())) => Err(primary),
            (Ok(()), Err(source)) => Err(BackupError::Deactivation {
                volume: snapshot,
                source,
            }),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    fn check_mount_and_scan(&self, fs: &FilesystemSpec, snapshot: &VolumeIdentity) -> Result<()> {
        match fsck::check_filesystem(self.runner, snapshot) {
            Ok(CheckOutcome::Clean) => {}
            Ok(CheckOutcome::CorrectedNonFatal) => {
                tracing::info!("fsck corrected errors on {snapshot}; continuing");
            }
            Ok(CheckOutcome::Failed(status)) => {
                return Err(BackupError::IntegrityCheck {
                    volume: snapshot.clone(),
                    status,
                    source: None,
                });
            }
            Err(source) => {
                return Err(BackupError::IntegrityCheck {
                    volume: snapshot.clone(),
                    status: None,
                    source: Some(source),
                });
            }
        }

        let mount_point = self.profile.snapshot_root.join(&fs.logical_volume);
        mount::ensure_mount_dir(self.runner, &mount_point)
            .and_then(|_| mount::mount(self.runner, snapshot, &mount_point, true))
            .map_err(|source| BackupError::Mount {
                volume: snapshot.clone(),
                mount_point: mount_point.clone(),
                source,
            })?;

        let scanned = self
            .scanner
            .scan(self.runner, fs, &mount_point)
            .map_err(|source| BackupError::Scan {
                mount_point: mount_point.clone(),
                source,
            });

        // Pairs with the successful mount regardless of the scan outcome.
        match (scanned, mount::unmount(self.runner, snapshot)) {
            (Err(primary), Err(release)) => {
                tracing::warn!("unmounting {snapshot} also failed: {release}");
                Err(primary)
            }
            (Err(primary), Ok(())) => Err(primary),
            (Ok(()), Err(source)) => Err(BackupError::Unmount {
                volume: snapshot.clone(),
                source,
            }),
            (Ok(()), Ok(())) => Ok(()),
        }
    }
}
