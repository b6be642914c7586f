//! Create per-agent Python environments and install their manifest once.
//!
//! Layout: `<agents_root>/<agent_name>/` is a venv. Its existence is the only
//! signal that the environment was created; `.requirements_installed` inside
//! it is the only signal that the manifest was installed. No in-memory state
//! survives between calls and nothing guards concurrent callers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use agentenv_core::config::{InterpreterConfig, PathsConfig};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::env::layout::EnvLayout;
use crate::error::{EnvError, Result};
use crate::info_log;
use crate::process::{Invocation, ProcessRunner, SystemRunner};

/// Zero-byte sentinel written after a successful install.
pub const MARKER_FILE_NAME: &str = ".requirements_installed";

/// Manifest file looked up inside an agent directory.
pub const REQUIREMENTS_FILE_NAME: &str = "requirements.txt";

/// Read-only snapshot of one agent environment.
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentInfo {
    pub name: String,
    pub path: PathBuf,
    pub interpreter: PathBuf,
    pub exists: bool,
    pub requirements_installed: bool,
    /// Modification time of the install marker
    pub installed_at: Option<DateTime<Utc>>,
}

pub struct Provisioner<R = SystemRunner> {
    agents_root: PathBuf,
    /// Interpreter used to run `-m venv`; looked up on PATH when unset
    base_python: Option<PathBuf>,
    layout: EnvLayout,
    runner: R,
}

impl Provisioner<SystemRunner> {
    /// Provisioner rooted at `AGENTENV_AGENTS_DIR` or `~/.agents`, honoring `AGENTENV_PYTHON`.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&PathsConfig::from_env(), &InterpreterConfig::from_env())
    }

    pub fn from_config(paths: &PathsConfig, interpreter: &InterpreterConfig) -> Result<Self> {
        let agents_root = paths.agents_root().ok_or(EnvError::HomeNotFound)?;
        let mut provisioner = Self::new(agents_root, SystemRunner);
        if let Some(ref python) = interpreter.python {
            provisioner = provisioner.with_base_python(python);
        }
        Ok(provisioner)
    }
}

impl<R: ProcessRunner> Provisioner<R> {
    pub fn new(agents_root: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            agents_root: agents_root.into(),
            base_python: None,
            layout: EnvLayout::current(),
            runner,
        }
    }

    pub fn with_base_python(mut self, python: impl Into<PathBuf>) -> Self {
        self.base_python = Some(python.into());
        self
    }

    pub fn with_layout(mut self, layout: EnvLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn agents_root(&self) -> &Path {
        &self.agents_root
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// `<agents_root>/<agent_name>`. The name is used verbatim as one path segment.
    pub fn env_path(&self, agent_name: &str) -> PathBuf {
        self.agents_root.join(agent_name)
    }

    pub fn interpreter(&self, env_path: &Path) -> PathBuf {
        self.layout.interpreter(env_path)
    }

    pub fn marker_path(env_path: &Path) -> PathBuf {
        env_path.join(MARKER_FILE_NAME)
    }

    /// Make sure the environment for `agent_name` exists and, if `requirements`
    /// names an existing file and the marker is absent, install it.
    ///
    /// Repeated calls after a successful one only stat the directory and marker.
    /// A failed install leaves no marker, so the next call installs again.
    pub fn ensure(&self, agent_name: &str, requirements: Option<&Path>) -> Result<PathBuf> {
        let env_path = self.env_path(agent_name);
        if agent_name.is_empty() {
            return Err(EnvError::EnvironmentCreation {
                path: env_path,
                reason: "agent name is empty".to_string(),
            });
        }

        if !env_path.exists() {
            self.create_environment(&env_path)?;
        }

        let marker = Self::marker_path(&env_path);
        if let Some(manifest) = requirements {
            if !manifest.exists() {
                tracing::debug!("No manifest at {}, skipping install", manifest.display());
            } else if marker.exists() {
                tracing::debug!("Requirements already installed for {}", agent_name);
            } else {
                self.install_requirements(&env_path, manifest)?;
                fs::File::create(&marker).map_err(|source| EnvError::Marker {
                    path: marker.clone(),
                    source,
                })?;
            }
        }

        Ok(env_path)
    }

    fn create_environment(&self, env_path: &Path) -> Result<()> {
        let creation_error = |reason: String| EnvError::EnvironmentCreation {
            path: env_path.to_path_buf(),
            reason,
        };

        if let Some(parent) = env_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| creation_error(format!("create {}: {}", parent.display(), e)))?;
        }

        let python = self.base_python().map_err(creation_error)?;
        info_log!("Creating environment {}", env_path.display());

        let invocation = Invocation::new(&python)
            .args(["-m", "venv"])
            .arg(env_path.as_os_str());
        let out = self
            .runner
            .output(&invocation)
            .map_err(|e| creation_error(format!("failed to launch {}: {}", python.display(), e)))?;
        if !out.status.success() {
            return Err(creation_error(format!(
                "venv failed with {}: {}",
                out.status,
                out.stderr.trim()
            )));
        }
        Ok(())
    }

    fn install_requirements(&self, env_path: &Path, manifest: &Path) -> Result<()> {
        let install_error = |reason: String| EnvError::DependencyInstall {
            manifest: manifest.to_path_buf(),
            reason,
        };

        info_log!(
            "Installing requirements from {} into {}",
            manifest.display(),
            env_path.display()
        );
        let python = self.interpreter(env_path);
        let invocation = Invocation::new(&python)
            .args(["-m", "pip", "install", "-r"])
            .arg(manifest.as_os_str());
        let status = self
            .runner
            .status(&invocation)
            .map_err(|e| install_error(format!("failed to launch {}: {}", python.display(), e)))?;
        if !status.success() {
            return Err(install_error(format!("pip install exited with {}", status)));
        }
        Ok(())
    }

    fn base_python(&self) -> std::result::Result<PathBuf, String> {
        if let Some(ref python) = self.base_python {
            return Ok(python.clone());
        }
        which::which("python3")
            .or_else(|_| which::which("python"))
            .map_err(|_| "python3 or python not found in PATH (set AGENTENV_PYTHON)".to_string())
    }

    /// Current state of one environment. Touches nothing.
    pub fn inspect(&self, agent_name: &str) -> EnvironmentInfo {
        let path = self.env_path(agent_name);
        let marker = Self::marker_path(&path);
        let installed_at = fs::metadata(&marker)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);
        EnvironmentInfo {
            name: agent_name.to_string(),
            interpreter: self.interpreter(&path),
            exists: path.is_dir(),
            requirements_installed: installed_at.is_some(),
            installed_at,
            path,
        }
    }

    /// Every environment directory under the agents root, sorted by name.
    pub fn list(&self) -> io::Result<Vec<EnvironmentInfo>> {
        let entries = match fs::read_dir(&self.agents_root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(String::from))
            .collect();
        names.sort();

        Ok(names.iter().map(|name| self.inspect(name)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRunner;
    use std::ffi::OsString;

    fn provisioner<'a>(root: &Path, runner: &'a RecordingRunner) -> Provisioner<&'a RecordingRunner> {
        Provisioner::new(root, runner)
            .with_base_python("python3")
            .with_layout(EnvLayout::Posix)
    }

    #[test]
    fn test_ensure_creates_env_once_without_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("nested").join(".agents");
        let runner = RecordingRunner::default();
        let p = provisioner(&root, &runner);

        let env = p.ensure("alpha", None).unwrap();
        assert_eq!(env, root.join("alpha"));
        assert!(env.is_dir());
        assert_eq!(runner.calls().len(), 1);
        let create = &runner.calls()[0];
        assert_eq!(create.program, PathBuf::from("python3"));
        assert_eq!(
            create.args,
            vec![
                OsString::from("-m"),
                OsString::from("venv"),
                env.clone().into_os_string()
            ]
        );

        let again = p.ensure("alpha", None).unwrap();
        assert_eq!(again, env);
        assert!(again.is_dir());
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_ensure_installs_manifest_once() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = tmp.path().join("requirements.txt");
        fs::write(&manifest, "requests\n").unwrap();
        let runner = RecordingRunner::default();
        let p = provisioner(&tmp.path().join("agents"), &runner);

        let env = p.ensure("beta", Some(&manifest)).unwrap();
        let marker = env.join(MARKER_FILE_NAME);
        assert!(marker.exists());
        assert_eq!(fs::metadata(&marker).unwrap().len(), 0);
        assert_eq!(runner.install_calls().len(), 1);

        let install = &runner.install_calls()[0];
        assert_eq!(install.program, env.join("bin").join("python"));
        assert_eq!(
            install.args,
            vec![
                OsString::from("-m"),
                OsString::from("pip"),
                OsString::from("install"),
                OsString::from("-r"),
                manifest.clone().into_os_string()
            ]
        );

        p.ensure("beta", Some(&manifest)).unwrap();
        p.ensure("beta", Some(&manifest)).unwrap();
        assert_eq!(runner.install_calls().len(), 1);
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn test_failed_install_leaves_no_marker_and_retries() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = tmp.path().join("requirements.txt");
        fs::write(&manifest, "does-not-exist==0\n").unwrap();
        let runner = RecordingRunner::default();
        runner.fail_installs(true);
        let p = provisioner(&tmp.path().join("agents"), &runner);

        let err = p.ensure("gamma", Some(&manifest)).unwrap_err();
        assert!(matches!(err, EnvError::DependencyInstall { .. }));
        let env = p.env_path("gamma");
        assert!(env.is_dir());
        assert!(!env.join(MARKER_FILE_NAME).exists());

        runner.fail_installs(false);
        p.ensure("gamma", Some(&manifest)).unwrap();
        assert_eq!(runner.install_calls().len(), 2);
        assert!(env.join(MARKER_FILE_NAME).exists());
        // environment is never re-created
        assert_eq!(runner.calls().len() - runner.install_calls().len(), 1);
    }

    #[test]
    fn test_missing_manifest_skips_install_but_creates_env() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::default();
        let p = provisioner(&tmp.path().join("agents"), &runner);

        let missing = tmp.path().join("nope").join("requirements.txt");
        let env = p.ensure("delta", Some(&missing)).unwrap();
        assert!(env.is_dir());
        assert!(runner.install_calls().is_empty());
        assert!(!env.join(MARKER_FILE_NAME).exists());
    }

    #[test]
    fn test_deleted_marker_triggers_reinstall() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = tmp.path().join("requirements.txt");
        fs::write(&manifest, "six\n").unwrap();
        let runner = RecordingRunner::default();
        let p = provisioner(&tmp.path().join("agents"), &runner);

        let env = p.ensure("eps", Some(&manifest)).unwrap();
        fs::remove_file(env.join(MARKER_FILE_NAME)).unwrap();
        p.ensure("eps", Some(&manifest)).unwrap();
        assert_eq!(runner.install_calls().len(), 2);
    }

    #[test]
    fn test_existing_directory_is_trusted() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("agents");
        fs::create_dir_all(root.join("half-made")).unwrap();
        let runner = RecordingRunner::default();
        let p = provisioner(&root, &runner);

        p.ensure("half-made", None).unwrap();
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_venv_failure_is_environment_creation_error() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::default();
        runner.fail_creates(true);
        let p = provisioner(&tmp.path().join("agents"), &runner);

        match p.ensure("zeta", None).unwrap_err() {
            EnvError::EnvironmentCreation { path, reason } => {
                assert_eq!(path, tmp.path().join("agents").join("zeta"));
                assert!(reason.contains("exit code 1"), "{}", reason);
                assert!(reason.contains("venv: boom"), "{}", reason);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_agent_name_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::default();
        let p = provisioner(tmp.path(), &runner);
        assert!(matches!(
            p.ensure("", None),
            Err(EnvError::EnvironmentCreation { .. })
        ));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_inspect_and_list() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("agents");
        let manifest = tmp.path().join("requirements.txt");
        fs::write(&manifest, "rich\n").unwrap();
        let runner = RecordingRunner::default();
        let p = provisioner(&root, &runner);

        assert!(p.list().unwrap().is_empty());

        p.ensure("b-agent", Some(&manifest)).unwrap();
        p.ensure("a-agent", None).unwrap();
        fs::write(root.join("stray-file"), "").unwrap();

        let listed = p.list().unwrap();
        let names: Vec<&str> = listed.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a-agent", "b-agent"]);
        assert!(!listed[0].requirements_installed);
        assert!(listed[1].requirements_installed);
        assert!(listed[1].installed_at.is_some());
        assert_eq!(listed[1].interpreter, root.join("b-agent").join("bin").join("python"));

        let absent = p.inspect("ghost");
        assert!(!absent.exists);
        assert!(!absent.requirements_installed);
    }

    #[test]
    fn test_from_config_uses_override_root() {
        let p = Provisioner::from_config(
            &PathsConfig {
                agents_dir: Some("/srv/agents".to_string()),
            },
            &InterpreterConfig {
                python: Some("/opt/python/bin/python3".to_string()),
            },
        )
        .unwrap();
        assert_eq!(p.agents_root(), Path::new("/srv/agents"));
        assert_eq!(p.env_path("bot"), Path::new("/srv/agents").join("bot"));
        assert_eq!(p.base_python(), Ok(PathBuf::from("/opt/python/bin/python3")));
    }
}
