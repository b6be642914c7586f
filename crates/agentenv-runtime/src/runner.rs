//! Run an agent's command inside its environment.
//!
//! The agent is named after its directory. The directory's `requirements.txt`
//! (if any) is handed to the provisioner, then the command is spawned with the
//! environment's interpreter and the agent directory as working directory.
//! Standard streams are inherited, not captured.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::env::provisioner::{Provisioner, REQUIREMENTS_FILE_NAME};
use crate::error::{EnvError, Result};
use crate::process::{Invocation, ProcessRunner, ProcessStatus, SystemRunner};

/// Entry file used when no command is given.
pub const DEFAULT_ENTRY_POINT: &str = "main.py";

/// Arguments passed to the environment's interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentCommand {
    /// A single script path or token
    Token(OsString),
    /// An ordered argument vector
    Tokens(Vec<OsString>),
}

impl AgentCommand {
    pub fn tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self::Tokens(tokens.into_iter().map(Into::into).collect())
    }

    fn into_args(self) -> Vec<OsString> {
        match self {
            Self::Token(token) => vec![token],
            Self::Tokens(tokens) => tokens,
        }
    }
}

impl From<&str> for AgentCommand {
    fn from(token: &str) -> Self {
        Self::Token(token.into())
    }
}

impl From<String> for AgentCommand {
    fn from(token: String) -> Self {
        Self::Token(token.into())
    }
}

impl From<&Path> for AgentCommand {
    fn from(path: &Path) -> Self {
        Self::Token(path.as_os_str().to_os_string())
    }
}

impl From<PathBuf> for AgentCommand {
    fn from(path: PathBuf) -> Self {
        Self::Token(path.into_os_string())
    }
}

impl From<Vec<String>> for AgentCommand {
    fn from(tokens: Vec<String>) -> Self {
        Self::tokens(tokens)
    }
}

impl From<Vec<&str>> for AgentCommand {
    fn from(tokens: Vec<&str>) -> Self {
        Self::tokens(tokens)
    }
}

/// Record of a finished agent process.
#[derive(Debug, Clone)]
pub struct CompletedProcess {
    /// Interpreter followed by the argument vector
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
    pub status: ProcessStatus,
}

impl CompletedProcess {
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code
    }
}

pub struct AgentRunner<R = SystemRunner> {
    provisioner: Provisioner<R>,
}

impl AgentRunner<SystemRunner> {
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Provisioner::from_env()?))
    }
}

impl<R: ProcessRunner> AgentRunner<R> {
    pub fn new(provisioner: Provisioner<R>) -> Self {
        Self { provisioner }
    }

    pub fn provisioner(&self) -> &Provisioner<R> {
        &self.provisioner
    }

    /// Provision the agent at `agent_path` and run `command` (default: `main.py`)
    /// with its interpreter. A non-zero exit is returned as
    /// [`EnvError::ProcessExecution`].
    pub fn run(&self, agent_path: &Path, command: Option<AgentCommand>) -> Result<CompletedProcess> {
        let (agent_dir, agent_name) = resolve_agent(agent_path)?;
        let requirements = agent_dir.join(REQUIREMENTS_FILE_NAME);
        let env_path = self.provisioner.ensure(&agent_name, Some(&requirements))?;

        let invocation = self.invocation(&agent_dir, &env_path, command);
        let command_line = invocation.display_command();
        tracing::debug!(agent = %agent_name, command = %command_line, "running agent");

        let status = self
            .provisioner
            .runner()
            .status(&invocation)
            .map_err(|source| EnvError::Spawn {
                program: invocation.program.to_string_lossy().into_owned(),
                source,
            })?;
        if !status.success() {
            return Err(EnvError::ProcessExecution {
                command: command_line,
                status,
            });
        }

        let mut args = vec![invocation.program.into_os_string()];
        args.extend(invocation.args);
        Ok(CompletedProcess {
            args,
            cwd: agent_dir,
            status,
        })
    }

    /// Interpreter of `env_path` followed by the resolved argument vector, run in `agent_dir`.
    pub fn invocation(
        &self,
        agent_dir: &Path,
        env_path: &Path,
        command: Option<AgentCommand>,
    ) -> Invocation {
        let args = match command {
            Some(command) => command.into_args(),
            None => vec![agent_dir.join(DEFAULT_ENTRY_POINT).into_os_string()],
        };
        Invocation::new(self.provisioner.interpreter(env_path))
            .args(args)
            .current_dir(agent_dir)
    }
}

/// Absolute agent directory and its final segment, used as the agent name.
fn resolve_agent(agent_path: &Path) -> Result<(PathBuf, String)> {
    let agent_dir = agent_path.canonicalize().map_err(|e| EnvError::AgentPath {
        path: agent_path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let invalid = |reason: &str| EnvError::AgentPath {
        path: agent_path.to_path_buf(),
        reason: reason.to_string(),
    };
    let agent_name = agent_dir
        .file_name()
        .ok_or_else(|| invalid("no final path segment to name the agent"))?
        .to_str()
        .map(String::from)
        .ok_or_else(|| invalid("agent directory name is not valid UTF-8"))?;
    Ok((agent_dir, agent_name))
}
