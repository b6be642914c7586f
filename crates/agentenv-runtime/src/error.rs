//! Errors surfaced by provisioning and running agents.
//!
//! Nothing here is retried or swallowed; every variant reaches the direct caller.

use std::path::PathBuf;

use thiserror::Error;

use crate::process::ProcessStatus;

pub type Result<T> = std::result::Result<T, EnvError>;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("Cannot determine home directory; set AGENTENV_AGENTS_DIR")]
    HomeNotFound,

    #[error("Failed to create environment at {}: {reason}", path.display())]
    EnvironmentCreation { path: PathBuf, reason: String },

    /// The marker is not written, so the next `ensure` installs again.
    #[error("Dependency install from {} failed: {reason}", manifest.display())]
    DependencyInstall { manifest: PathBuf, reason: String },

    #[error("Failed to write install marker {}: {source}", path.display())]
    Marker {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid agent path {}: {reason}", path.display())]
    AgentPath { path: PathBuf, reason: String },

    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' failed with {status}")]
    ProcessExecution {
        command: String,
        status: ProcessStatus,
    },
}

impl EnvError {
    /// Exit code of the failed agent process, if this error came from one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            EnvError::ProcessExecution { status, .. } => Some(status.code.unwrap_or(1)),
            _ => None,
        }
    }
}
