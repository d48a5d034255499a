// SPDX-License-Identifier: GPL-3.0-only

//! Canonical domain models for snapback
//!
//! This crate defines the types shared between the low-level system crate
//! and the orchestrator binary:
//!
//! - `VolumeIdentity` → one logical volume inside a volume group
//! - `FilesystemSpec` → one backed-up filesystem as declared in configuration
//! - `HostProfile` → the set of filesystems to back up for one host

pub mod filesystem;
pub mod volume;

// Re-export all public types
pub use filesystem::*;
pub use volume::*;
