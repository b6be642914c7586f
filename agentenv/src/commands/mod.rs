//! CLI commands. Thin wrappers over `agentenv_runtime`; they only render output.

pub mod agent;
pub mod env;
