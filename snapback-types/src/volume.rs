// SPDX-License-Identifier: GPL-3.0-only

//! Logical volume identity
//!
//! Identifies a logical volume inside a volume group and derives the two
//! textual forms the LVM tools understand: the short `vg/lv` name and the
//! device-mapper path under `/dev/mapper`.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identity of one logical volume inside a volume group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VolumeIdentity {
    /// Volume group name
    pub group: String,

    /// Logical volume name
    pub name: String,
}

impl VolumeIdentity {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }

    /// The short `vg/lv` form accepted by lvcreate, lvchange and friends.
    pub fn text_name(&self) -> String {
        format!("{}/{}", self.group, self.name)
    }

    /// The device-mapper node for this volume.
    ///
    /// Device-mapper joins group and volume with a single `-`, so any `-`
    /// inside either name is doubled, matching LVM's own escaping.
    pub fn dm_path(&self) -> PathBuf {
        PathBuf::from(format!(
            "/dev/mapper/{}-{}",
            dm_escape(&self.group),
            dm_escape(&self.name)
        ))
    }
}

impl fmt::Display for VolumeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.name)
    }
}

fn dm_escape(name: &str) -> String {
    name.replace('-', "--")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_text_name_and_dm_path() {
        let vol = VolumeIdentity::new("vg0", "root.2024.01.15");
        assert_eq!(vol.text_name(), "vg0/root.2024.01.15");
        assert_eq!(
            vol.dm_path(),
            PathBuf::from("/dev/mapper/vg0-root.2024.01.15")
        );
    }

    #[test]
    fn doubles_dashes_in_dm_path() {
        let vol = VolumeIdentity::new("my-vg", "my-lv.2024.01.15");
        assert_eq!(
            vol.dm_path(),
            PathBuf::from("/dev/mapper/my--vg-my--lv.2024.01.15")
        );

        // A name that is nothing but separators still round-trips the rule.
        let vol = VolumeIdentity::new("a-b-c", "d");
        assert_eq!(vol.dm_path(), PathBuf::from("/dev/mapper/a--b--c-d"));
    }

    #[test]
    fn display_matches_text_name() {
        let vol = VolumeIdentity::new("vg0", "home");
        assert_eq!(vol.to_string(), vol.text_name());
    }
}
