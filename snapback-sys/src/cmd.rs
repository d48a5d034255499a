// SPDX-License-Identifier: GPL-3.0-only

//! Privileged command execution
//!
//! Every volume-manager and filesystem mutation goes through the
//! [`CommandRunner`] seam defined here. The production [`HostRunner`]
//! elevates with sudo when the process is not already root and supports a
//! dry-run mode that logs commands without executing them.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Result, SysError};

/// An external command to execute: program, arguments and an optional
/// working directory override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// The logged form: program and arguments joined with spaces.
    pub fn render(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Result of one command execution.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// Exit code; `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// `false` when the command was skipped under dry-run
    pub executed: bool,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// The seam between the backup orchestration and the host.
///
/// The orchestrator never spawns processes directly; it hands a
/// [`CommandSpec`] to whatever runner it was given. Tests substitute a
/// recording fake here.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutcome>;
}

/// Runs commands on the host, elevating with sudo when not already root.
pub struct HostRunner {
    sudo: Option<PathBuf>,
    dry_run: bool,
}

impl HostRunner {
    pub fn new(dry_run: bool) -> Result<Self> {
        // Root needs no elevation; otherwise sudo must be present.
        let sudo = if unsafe { libc::geteuid() } == 0 {
            None
        } else {
            Some(which::which("sudo").map_err(|_| SysError::SudoMissing)?)
        };

        Ok(Self { sudo, dry_run })
    }
}

impl CommandRunner for HostRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutcome> {
        tracing::info!("{}", spec.render());
        if let Some(dir) = spec.dir() {
            tracing::info!("  in dir: {}", dir.display());
        }

        if self.dry_run {
            return Ok(CommandOutcome {
                code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
                executed: false,
            });
        }

        let mut command = match &self.sudo {
            Some(sudo) => {
                let mut command = Command::new(sudo);
                command.arg(spec.program());
                command
            }
            None => Command::new(spec.program()),
        };
        command.args(&spec.args);
        if let Some(dir) = spec.dir() {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| SysError::Spawn {
            command: spec.render(),
            source,
        })?;

        Ok(CommandOutcome {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            executed: true,
        })
    }
}

/// Runs a command and treats any non-zero exit as an error carrying the
/// captured stderr.
pub fn run_checked(runner: &dyn CommandRunner, spec: &CommandSpec) -> Result<()> {
    let outcome = runner.run(spec)?;
    if !outcome.success() {
        return Err(SysError::CommandFailed {
            command: spec.render(),
            code: outcome.code,
            stderr: outcome.stderr.trim().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_program_and_arguments() {
        let spec = CommandSpec::new("lvchange")
            .args(["-ay", "-K"])
            .arg("/dev/mapper/vg0-root.2024.01.15");
        assert_eq!(spec.render(), "lvchange -ay -K /dev/mapper/vg0-root.2024.01.15");
    }

    #[test]
    fn renders_bare_program() {
        assert_eq!(CommandSpec::new("lvs").render(), "lvs");
    }

    #[test]
    fn only_zero_exit_is_success() {
        let outcome = CommandOutcome {
            code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
            executed: true,
        };
        assert!(outcome.success());

        let failed = CommandOutcome {
            code: Some(1),
            ..outcome.clone()
        };
        assert!(!failed.success());

        let signalled = CommandOutcome {
            code: None,
            ..outcome
        };
        assert!(!signalled.success());
    }

    #[test]
    fn run_checked_surfaces_stderr() {
        struct Failing;
        impl CommandRunner for Failing {
            fn run(&self, _spec: &CommandSpec) -> Result<CommandOutcome> {
                Ok(CommandOutcome {
                    code: Some(5),
                    stdout: String::new(),
                    stderr: "  device busy\n".to_string(),
                    executed: true,
                })
            }
        }

        let err = run_checked(&Failing, &CommandSpec::new("umount")).unwrap_err();
        match err {
            SysError::CommandFailed { command, code, stderr } => {
                assert_eq!(command, "umount");
                assert_eq!(code, Some(5));
                assert_eq!(stderr, "device busy");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
