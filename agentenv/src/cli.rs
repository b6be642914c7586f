use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// agentenv - isolated Python environments per agent
#[derive(Parser, Debug)]
#[command(name = "agentenv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding one environment per agent (default: ~/.agents)
    #[arg(long, global = true, value_name = "DIR", env = "AGENTENV_AGENTS_DIR")]
    pub agents_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the agent's environment if missing and install its requirements once
    Ensure {
        /// Agent name, used verbatim as the environment directory name
        #[arg(value_name = "AGENT_NAME")]
        agent_name: String,

        /// Requirements file to install on first use
        #[arg(long, short = 'r', value_name = "FILE")]
        requirements: Option<PathBuf>,
    },

    /// Run a command for the agent in AGENT_DIR with its environment's interpreter
    Run {
        /// Agent source directory; its name selects the environment
        #[arg(value_name = "AGENT_DIR")]
        agent_dir: PathBuf,

        /// Interpreter arguments (default: AGENT_DIR/main.py)
        #[arg(last = true, value_name = "ARGS")]
        command: Vec<OsString>,
    },

    /// Print the environment root and interpreter for an agent
    Path {
        /// Agent name
        #[arg(value_name = "AGENT_NAME")]
        agent_name: String,
    },

    /// List provisioned agent environments
    List {
        /// Output as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
}
