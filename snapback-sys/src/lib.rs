// SPDX-License-Identifier: GPL-3.0-only

//! Low-level system operations for snapback
//!
//! This crate wraps every external subsystem the backup run touches:
//! - privileged command execution (with sudo elevation and dry-run)
//! - the LVM CLI surface: inventory queries, snapshot creation,
//!   activation and deactivation
//! - mounting and unmounting snapshot devices
//! - filesystem consistency checks
//!
//! Everything here is blocking and strictly sequential; device-mapper
//! mutations are host-wide state and must not be issued concurrently.

pub mod cmd;
pub mod error;
pub mod fsck;
pub mod lvm;
pub mod mount;

pub use cmd::{CommandOutcome, CommandRunner, CommandSpec, HostRunner, run_checked};
pub use error::{Result, SysError};
pub use fsck::{CheckOutcome, check_filesystem};
pub use lvm::{VolumeInventory, activate, create_snapshot, deactivate};
pub use mount::{ensure_mount_dir, mount, unmount};
