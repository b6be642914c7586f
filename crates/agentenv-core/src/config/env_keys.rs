//! 环境变量 key 常量
//!
//! 主变量统一使用 `AGENTENV_*` 前缀。

/// Agents root and per-agent environment locations
pub mod paths {
    /// Overrides `<home>/.agents` as the parent of every agent environment.
    pub const AGENTENV_AGENTS_DIR: &str = "AGENTENV_AGENTS_DIR";
    pub const AGENTS_DIR_ALIASES: &[&str] = &[];
}

/// Base interpreter used to create new environments
pub mod interpreter {
    pub const AGENTENV_PYTHON: &str = "AGENTENV_PYTHON";
    pub const PYTHON_ALIASES: &[&str] = &[];
}

/// 可观测性与日志
pub mod observability {
    pub const AGENTENV_QUIET: &str = "AGENTENV_QUIET";
    pub const QUIET_ALIASES: &[&str] = &[];

    pub const AGENTENV_LOG_LEVEL: &str = "AGENTENV_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &[];

    pub const AGENTENV_LOG_JSON: &str = "AGENTENV_LOG_JSON";
    pub const LOG_JSON_ALIASES: &[&str] = &[];
}
