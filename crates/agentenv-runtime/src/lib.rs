pub mod env;
pub mod error;
pub mod log;
pub mod process;
pub mod runner;

pub use env::layout::EnvLayout;
pub use env::provisioner::{EnvironmentInfo, Provisioner, MARKER_FILE_NAME, REQUIREMENTS_FILE_NAME};
pub use error::{EnvError, Result};
pub use process::{Invocation, ProcessOutput, ProcessRunner, ProcessStatus, SystemRunner};
pub use runner::{AgentCommand, AgentRunner, CompletedProcess, DEFAULT_ENTRY_POINT};

#[cfg(test)]
mod testing;
