//! 按领域分组的配置结构体
//!
//! 从环境变量加载，统一 fallback 逻辑。

use super::env_keys::{interpreter, observability as obv_keys, paths};
use super::loader::{env_bool, env_optional, env_or};
use std::path::PathBuf;

/// Directory under the user's home that holds one environment per agent.
pub const AGENTS_DIR_NAME: &str = ".agents";

/// Agents root configuration
#[derive(Debug, Clone)]
pub struct PathsConfig {
    /// Explicit agents root; `None` means `<home>/.agents`
    pub agents_dir: Option<String>,
}

impl PathsConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            agents_dir: env_optional(paths::AGENTENV_AGENTS_DIR, paths::AGENTS_DIR_ALIASES),
        }
    }

    /// Resolve the agents root. `None` only when no override is set and the
    /// home directory cannot be determined.
    pub fn agents_root(&self) -> Option<PathBuf> {
        match self.agents_dir {
            Some(ref dir) => Some(PathBuf::from(dir)),
            None => dirs::home_dir().map(|home| home.join(AGENTS_DIR_NAME)),
        }
    }
}

/// Base interpreter used when a new environment has to be created
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    pub python: Option<String>,
}

impl InterpreterConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            python: env_optional(interpreter::AGENTENV_PYTHON, interpreter::PYTHON_ALIASES),
        }
    }
}

/// 可观测性配置：quiet、log_level、log_json
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            let quiet = env_bool(obv_keys::AGENTENV_QUIET, obv_keys::QUIET_ALIASES, false);
            let log_level = env_or(
                obv_keys::AGENTENV_LOG_LEVEL,
                obv_keys::LOG_LEVEL_ALIASES,
                || "agentenv=info".to_string(),
            );
            let log_json = env_bool(obv_keys::AGENTENV_LOG_JSON, obv_keys::LOG_JSON_ALIASES, false);
            Self {
                quiet,
                log_level,
                log_json,
            }
        })
    }
}
