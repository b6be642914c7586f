//! agentenv 统一配置层
//!
//! 所有环境变量读取集中在此模块，业务代码通过结构化配置访问，避免直接 `std::env::var`。
//!
//! - `loader`：env_or、env_optional、env_bool 等辅助函数
//! - `schema`：PathsConfig、InterpreterConfig、ObservabilityConfig
//! - `env_keys`：key 常量

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, load_dotenv, load_dotenv_from_dir, set_env_var};
pub use schema::{InterpreterConfig, ObservabilityConfig, PathsConfig, AGENTS_DIR_NAME};
