//! Process launching seam.
//!
//! Every subprocess this crate starts (venv creation, pip install, the agent
//! itself) goes through [`ProcessRunner`]. The production implementation is
//! [`SystemRunner`]; tests substitute a recorder.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// A fully assembled command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Working directory; `None` inherits the caller's.
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Program followed by arguments, lossily rendered for messages.
    pub fn display_command(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

/// Exit status of a finished process. `code` is `None` when it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStatus {
    pub code: Option<i32>,
}

impl ProcessStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ProcessStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => write!(f, "termination by signal"),
        }
    }
}

/// Captured result of [`ProcessRunner::output`].
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ProcessStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Runs an [`Invocation`] to completion.
pub trait ProcessRunner {
    /// Run with inherited stdin/stdout/stderr and wait for exit.
    fn status(&self, invocation: &Invocation) -> io::Result<ProcessStatus>;

    /// Run with stdout/stderr captured and wait for exit.
    fn output(&self, invocation: &Invocation) -> io::Result<ProcessOutput>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn status(&self, invocation: &Invocation) -> io::Result<ProcessStatus> {
        (**self).status(invocation)
    }

    fn output(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        (**self).output(invocation)
    }
}

/// `std::process::Command` backed runner.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn status(&self, invocation: &Invocation) -> io::Result<ProcessStatus> {
        tracing::debug!(command = %invocation.display_command(), cwd = ?invocation.cwd, "spawn");
        invocation.to_command().status().map(ProcessStatus::from)
    }

    fn output(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        tracing::debug!(command = %invocation.display_command(), cwd = ?invocation.cwd, "spawn (captured)");
        let out = invocation
            .to_command()
            .stdin(Stdio::null())
            .output()?;
        Ok(ProcessOutput {
            status: out.status.into(),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }
}
