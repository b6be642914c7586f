//! `agentenv ensure` / `agentenv run` / `agentenv path`

use anyhow::Result;
use std::ffi::OsString;
use std::path::Path;

use agentenv_core::config::{InterpreterConfig, PathsConfig};
use agentenv_runtime::{AgentCommand, AgentRunner, Provisioner};

/// Provisioner from env/.env config, with `--agents-dir` taking precedence.
pub fn build_provisioner(agents_dir: Option<&Path>) -> Result<Provisioner> {
    let mut paths = PathsConfig::from_env();
    if let Some(dir) = agents_dir {
        paths.agents_dir = Some(dir.to_string_lossy().into_owned());
    }
    Ok(Provisioner::from_config(&paths, &InterpreterConfig::from_env())?)
}

/// `agentenv ensure`
pub fn cmd_ensure(provisioner: &Provisioner, agent_name: &str, requirements: Option<&Path>) -> Result<()> {
    let env_path = provisioner.ensure(agent_name, requirements)?;
    println!("{}", env_path.display());
    Ok(())
}

/// `agentenv run`
pub fn cmd_run(provisioner: Provisioner, agent_dir: &Path, command: Vec<OsString>) -> Result<()> {
    let done = AgentRunner::new(provisioner).run(agent_dir, agent_command(command))?;
    tracing::debug!("agent exited with {}", done.status);
    Ok(())
}

/// `agentenv path`
pub fn cmd_path(provisioner: &Provisioner, agent_name: &str) -> Result<()> {
    let env_path = provisioner.env_path(agent_name);
    if !env_path.exists() {
        eprintln!(
            "Environment for '{}' has not been created yet (run `agentenv ensure {}`).",
            agent_name, agent_name
        );
    }
    for line in path_lines(provisioner, agent_name) {
        println!("{}", line);
    }
    Ok(())
}

/// Environment root and interpreter, both rendered lossily.
fn path_lines(provisioner: &Provisioner, agent_name: &str) -> [String; 2] {
    let env_path = provisioner.env_path(agent_name);
    let interpreter = provisioner.interpreter(&env_path);
    [
        env_path.display().to_string(),
        interpreter.display().to_string(),
    ]
}

/// Empty trailing args mean "run the default entry point".
fn agent_command(args: Vec<OsString>) -> Option<AgentCommand> {
    if args.is_empty() {
        None
    } else {
        Some(AgentCommand::tokens(args))
    }
}
