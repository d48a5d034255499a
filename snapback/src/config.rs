// SPDX-License-Identifier: GPL-3.0-only

//! Host configuration
//!
//! One TOML file maps hostnames to backup profiles. The file is read once
//! at startup and validated before anything else happens; a run never
//! starts mutating volume state with a half-understood configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use snapback_types::HostProfile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path:?}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("host {host:?} not found in config file")]
    HostNotFound { host: String },
}

/// The whole configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Integrity scanner binary; when absent, `gosure` is located on PATH
    pub scanner: Option<PathBuf>,

    /// Hostname → backup profile
    pub hosts: BTreeMap<String, HostProfile>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&raw).map_err(|error| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;

        validate(&config).map_err(|reason| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;

        Ok(config)
    }

    pub fn host(&self, name: &str) -> Result<&HostProfile, ConfigError> {
        self.hosts.get(name).ok_or_else(|| ConfigError::HostNotFound {
            host: name.to_string(),
        })
    }
}

fn validate(config: &Config) -> Result<(), String> {
    for (host, profile) in &config.hosts {
        if profile.filesystems.is_empty() {
            return Err(format!("host {host:?} declares no filesystems"));
        }
        if profile.snapshot_root.as_os_str().is_empty() {
            return Err(format!("host {host:?} has an empty snapshot_root"));
        }

        let mut seen = BTreeSet::new();
        for fs in &profile.filesystems {
            if fs.volume_group.is_empty() || fs.logical_volume.is_empty() {
                return Err(format!(
                    "host {host:?} has a filesystem with an empty volume name"
                ));
            }
            if !seen.insert((fs.volume_group.clone(), fs.logical_volume.clone())) {
                return Err(format!(
                    "host {host:?} lists {}/{} more than once",
                    fs.volume_group, fs.logical_volume
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        scanner = "/usr/local/bin/gosure"

        [hosts.vulcan]
        snapshot_root = "/mnt/snap"

        [[hosts.vulcan.filesystems]]
        volume_group = "vg0"
        logical_volume = "root"
        mount_point = "/"

        [[hosts.vulcan.filesystems]]
        volume_group = "vg0"
        logical_volume = "home"
        mount_point = "/home"
    "#;

    #[test]
    fn parses_host_profiles() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        validate(&config).unwrap();

        let profile = config.host("vulcan").unwrap();
        assert_eq!(profile.snapshot_root, PathBuf::from("/mnt/snap"));
        assert_eq!(profile.filesystems.len(), 2);
        assert_eq!(profile.filesystems[0].logical_volume, "root");
        assert_eq!(
            config.scanner.as_deref(),
            Some(Path::new("/usr/local/bin/gosure"))
        );
    }

    #[test]
    fn scanner_is_optional() {
        let config: Config = toml::from_str(
            r#"
            [hosts.a]
            snapshot_root = "/mnt/snap"
            [[hosts.a.filesystems]]
            volume_group = "vg0"
            logical_volume = "root"
            mount_point = "/"
            "#,
        )
        .unwrap();
        assert!(config.scanner.is_none());
    }

    #[test]
    fn unknown_host_is_an_error() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let err = config.host("romulus").unwrap_err();
        assert!(matches!(err, ConfigError::HostNotFound { host } if host == "romulus"));
    }

    #[test]
    fn rejects_empty_filesystem_list() {
        let config: Config = toml::from_str(
            r#"
            [hosts.a]
            snapshot_root = "/mnt/snap"
            filesystems = []
            "#,
        )
        .unwrap();
        let reason = validate(&config).unwrap_err();
        assert!(reason.contains("declares no filesystems"));
    }

    #[test]
    fn rejects_duplicate_source_volumes() {
        let config: Config = toml::from_str(
            r#"
            [hosts.a]
            snapshot_root = "/mnt/snap"
            [[hosts.a.filesystems]]
            volume_group = "vg0"
            logical_volume = "root"
            mount_point = "/"
            [[hosts.a.filesystems]]
            volume_group = "vg0"
            logical_volume = "root"
            mount_point = "/other"
            "#,
        )
        .unwrap();
        let reason = validate(&config).unwrap_err();
        assert!(reason.contains("more than once"));
    }

    #[test]
    fn parses_sample_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/config.sample.toml");
        let config = Config::load(&path).unwrap();
        assert!(config.host("vulcan").is_ok());
    }
}
