// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

/// Error types for system-level operations
#[derive(Debug, Error)]
pub enum SysError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("sudo not found; rerun as root or install sudo")]
    SudoMissing,

    #[error("unparseable lvs output line: {0:?}")]
    InvalidInventoryLine(String),
}

/// Result type alias for system operations
pub type Result<T> = std::result::Result<T, SysError>;
