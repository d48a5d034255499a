// SPDX-License-Identifier: GPL-3.0-only

//! Integrity scanner invocation
//!
//! The scanner is pointed at the catalog file on the live filesystem and
//! run with its working directory inside the mounted snapshot, so the tree
//! it walks is the frozen one.

use std::path::{Path, PathBuf};

use snapback_sys::{CommandRunner, CommandSpec, Result, run_checked};
use snapback_types::FilesystemSpec;

/// Name of the catalog file kept at the root of each scanned filesystem.
const CATALOG_NAME: &str = "2sure";

pub struct Scanner {
    program: PathBuf,
}

impl Scanner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn scan_spec(&self, fs: &FilesystemSpec, workdir: &Path) -> CommandSpec {
        let catalog = fs.mount_point.join(CATALOG_NAME);
        CommandSpec::new(self.program.display().to_string())
            .arg("-file")
            .arg(catalog.display().to_string())
            .arg("update")
            .current_dir(workdir)
    }

    /// Update the filesystem's catalog from the snapshot mounted at
    /// `workdir`. Only a zero exit counts as success.
    pub fn scan(
        &self,
        runner: &dyn CommandRunner,
        fs: &FilesystemSpec,
        workdir: &Path,
    ) -> Result<()> {
        // TODO: fall back to a full fresh scan when the live filesystem has
        // no catalog yet, instead of failing the update.
        run_checked(runner, &self.scan_spec(fs, workdir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_update_invocation_inside_snapshot() {
        let scanner = Scanner::new("/usr/local/bin/gosure");
        let fs = FilesystemSpec {
            volume_group: "vg0".to_string(),
            logical_volume: "home".to_string(),
            mount_point: PathBuf::from("/home"),
        };

        let spec = scanner.scan_spec(&fs, Path::new("/mnt/snap/home"));
        assert_eq!(
            spec.render(),
            "/usr/local/bin/gosure -file /home/2sure update"
        );
        assert_eq!(spec.dir(), Some(Path::new("/mnt/snap/home")));
    }

    #[test]
    fn catalog_for_the_root_filesystem() {
        let scanner = Scanner::new("gosure");
        let fs = FilesystemSpec {
            volume_group: "vg0".to_string(),
            logical_volume: "root".to_string(),
            mount_point: PathBuf::from("/"),
        };

        let spec = scanner.scan_spec(&fs, Path::new("/mnt/snap/root"));
        assert_eq!(spec.render(), "gosure -file /2sure update");
    }
}
