//! Recording `ProcessRunner` used by unit tests.

use std::cell::{Cell, RefCell};
use std::io;
use std::path::PathBuf;

use crate::process::{Invocation, ProcessOutput, ProcessRunner, ProcessStatus};

/// Records every invocation. `-m venv <dir>` creates `<dir>`; `-m pip` is an
/// install; anything else is treated as the agent process.
#[derive(Default)]
pub(crate) struct RecordingRunner {
    calls: RefCell<Vec<Invocation>>,
    fail_creates: Cell<bool>,
    fail_installs: Cell<bool>,
    agent_exit: Cell<i32>,
}

impl RecordingRunner {
    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub(crate) fn install_calls(&self) -> Vec<Invocation> {
        self.calls
            .borrow()
            .iter()
            .filter(|inv| is_module(inv, "pip"))
            .cloned()
            .collect()
    }

    pub(crate) fn fail_creates(&self, fail: bool) {
        self.fail_creates.set(fail);
    }

    pub(crate) fn fail_installs(&self, fail: bool) {
        self.fail_installs.set(fail);
    }

    pub(crate) fn set_agent_exit(&self, code: i32) {
        self.agent_exit.set(code);
    }
}

fn is_module(inv: &Invocation, module: &str) -> bool {
    inv.args.len() >= 2 && inv.args[0].to_str() == Some("-m") && inv.args[1].to_str() == Some(module)
}

impl ProcessRunner for RecordingRunner {
    fn status(&self, invocation: &Invocation) -> io::Result<ProcessStatus> {
        self.calls.borrow_mut().push(invocation.clone());
        let code = if is_module(invocation, "pip") {
            if self.fail_installs.get() {
                1
            } else {
                0
            }
        } else {
            self.agent_exit.get()
        };
        Ok(ProcessStatus { code: Some(code) })
    }

    fn output(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        self.calls.borrow_mut().push(invocation.clone());
        if self.fail_creates.get() {
            return Ok(ProcessOutput {
                status: ProcessStatus { code: Some(1) },
                stdout: String::new(),
                stderr: "venv: boom\n".to_string(),
            });
        }
        if is_module(invocation, "venv") {
            if let Some(dir) = invocation.args.get(2) {
                let dir = PathBuf::from(dir);
                std::fs::create_dir_all(dir.join("bin"))?;
                std::fs::write(dir.join("bin").join("python"), "")?;
            }
        }
        Ok(ProcessOutput {
            status: ProcessStatus { code: Some(0) },
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}
