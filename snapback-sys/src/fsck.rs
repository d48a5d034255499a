// SPDX-License-Identifier: GPL-3.0-only

//! Filesystem consistency checks
//!
//! fsck overloads its exit status: 0 is clean, 1 is "errors were corrected"
//! and still fine to mount, everything else is a hard failure. The mapping
//! lives here as a tagged outcome so callers never special-case raw codes.

use snapback_types::VolumeIdentity;

use crate::cmd::{CommandRunner, CommandSpec};
use crate::error::Result;

/// Interpreted result of a consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Exit status 0: no errors
    Clean,
    /// Exit status 1: errors were found and corrected, non-fatal
    CorrectedNonFatal,
    /// Any other status (or death by signal)
    Failed(Option<i32>),
}

impl CheckOutcome {
    /// Whether the checked filesystem may proceed to mount.
    pub fn mountable(&self) -> bool {
        matches!(self, CheckOutcome::Clean | CheckOutcome::CorrectedNonFatal)
    }
}

fn check_spec(volume: &VolumeIdentity) -> CommandSpec {
    // -p: preen (non-interactive automatic repair), -f: force even if clean
    CommandSpec::new("fsck")
        .args(["-p", "-f"])
        .arg(volume.dm_path().display().to_string())
}

/// Run `fsck -p -f` against the volume's device node.
pub fn check_filesystem(runner: &dyn CommandRunner, volume: &VolumeIdentity) -> Result<CheckOutcome> {
    let outcome = runner.run(&check_spec(volume))?;
    Ok(match outcome.code {
        Some(0) => CheckOutcome::Clean,
        Some(1) => CheckOutcome::CorrectedNonFatal,
        code => CheckOutcome::Failed(code),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::CommandOutcome;

    struct FixedStatus(Option<i32>);

    impl CommandRunner for FixedStatus {
        fn run(&self, _spec: &CommandSpec) -> Result<CommandOutcome> {
            Ok(CommandOutcome {
                code: self.0,
                stdout: String::new(),
                stderr: String::new(),
                executed: true,
            })
        }
    }

    fn check_with(code: Option<i32>) -> CheckOutcome {
        let volume = VolumeIdentity::new("vg0", "root.2024.01.15");
        check_filesystem(&FixedStatus(code), &volume).unwrap()
    }

    #[test]
    fn maps_exit_statuses() {
        assert_eq!(check_with(Some(0)), CheckOutcome::Clean);
        assert_eq!(check_with(Some(1)), CheckOutcome::CorrectedNonFatal);
        assert_eq!(check_with(Some(4)), CheckOutcome::Failed(Some(4)));
        assert_eq!(check_with(None), CheckOutcome::Failed(None));
    }

    #[test]
    fn statuses_zero_and_one_permit_mounting() {
        assert!(CheckOutcome::Clean.mountable());
        assert!(CheckOutcome::CorrectedNonFatal.mountable());
        assert!(!CheckOutcome::Failed(Some(8)).mountable());
    }

    #[test]
    fn builds_preen_mode_invocation() {
        let volume = VolumeIdentity::new("vg0", "root.2024.01.15");
        assert_eq!(
            check_spec(&volume).render(),
            "fsck -p -f /dev/mapper/vg0-root.2024.01.15"
        );
    }
}
