//! Per-agent environment management: `~/.agents/<agent_name>/`.
//!
//! `provisioner` creates the environment and installs its manifest once;
//! `layout` maps an environment root to its interpreter.

pub mod layout;
pub mod provisioner;
