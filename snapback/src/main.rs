// SPDX-License-Identifier: GPL-3.0-only

//! snapback - crash-consistent backups of LVM-managed filesystems
//!
//! Takes copy-on-write snapshots of every filesystem configured for this
//! host, then runs an external file-integrity scanner against each frozen
//! snapshot so the live filesystems are never touched by the scan.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

mod backup;
mod config;
mod error;
mod namer;
mod scan;

use backup::Backup;
use config::Config;
use error::BackupError;
use namer::Namer;
use scan::Scanner;
use snapback_sys::{HostRunner, VolumeInventory};

#[derive(Parser)]
#[command(name = "snapback")]
#[command(about = "Crash-consistent LVM snapshot backups with integrity scanning", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "/etc/snapback.toml")]
    config: PathBuf,

    /// Back up this host's profile instead of the detected hostname
    #[arg(long)]
    host: Option<String>,

    /// Log the commands a run would execute without executing them
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("snapback=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;

    let host = match cli.host {
        Some(host) => host,
        None => detect_hostname()?,
    };
    tracing::info!("backing up host {host:?}");
    let profile = config.host(&host)?;

    let runner = HostRunner::new(cli.dry_run)?;
    if cli.dry_run {
        tracing::info!("dry run: commands are logged, not executed");
    }

    let scanner = match &config.scanner {
        Some(path) => Scanner::new(path.clone()),
        None => Scanner::new(
            which::which("gosure")
                .context("integrity scanner 'gosure' not found; set `scanner` in the config file")?,
        ),
    };

    let namer = Namer::new();
    tracing::info!("backup timestamp {}", namer.timestamp());

    let inventory =
        VolumeInventory::load(&runner).map_err(|source| BackupError::Inventory { source })?;

    Backup::new(profile, &namer, inventory, &runner, &scanner).run()?;

    tracing::info!("backup complete");
    Ok(())
}

fn detect_hostname() -> Result<String> {
    let hostname = nix::unistd::gethostname().context("unable to read hostname")?;
    hostname
        .into_string()
        .map_err(|raw| anyhow::anyhow!("hostname {raw:?} is not valid UTF-8"))
}
