mod cli;
mod commands;

use agentenv_core::{config, observability};
use agentenv_runtime::EnvError;
use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // .env first so clap's `env = ...` fallbacks see its values
    config::load_dotenv();
    observability::init_tracing();
    let cli = Cli::parse();

    let result = dispatch(cli);
    if let Err(ref err) = result {
        // Mirror the agent's own exit code instead of a generic failure.
        if let Some(code) = err.downcast_ref::<EnvError>().and_then(EnvError::exit_code) {
            eprintln!("Error: {}", err);
            std::process::exit(code);
        }
    }
    result
}

fn dispatch(cli: Cli) -> Result<()> {
    let provisioner = commands::agent::build_provisioner(cli.agents_dir.as_deref())?;

    match cli.command {
        Commands::Ensure {
            agent_name,
            requirements,
        } => {
            commands::agent::cmd_ensure(&provisioner, &agent_name, requirements.as_deref())?;
        }
        Commands::Run { agent_dir, command } => {
            commands::agent::cmd_run(provisioner, &agent_dir, command)?;
        }
        Commands::Path { agent_name } => {
            commands::agent::cmd_path(&provisioner, &agent_name)?;
        }
        Commands::List { json } => {
            commands::env::cmd_list(&provisioner, json)?;
        }
    }

    Ok(())
}
