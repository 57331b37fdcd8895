//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// cmdrelay - remote command queue relay for game servers
#[derive(Parser)]
#[command(
    name = "cmdrelay",
    about = "Polls a remote command queue and runs eligible commands on this game server",
    version,
    after_help = "Logs are written to: ~/.local/share/cmdrelay/logs/cmdrelay.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Poll the command queue until interrupted. SIGUSR1 forces a poll.
    Run {
        /// Log to stderr instead of the log file
        #[arg(long)]
        stderr: bool,
    },

    /// Fetch and execute pending commands once, right now
    Force,

    /// Verify a server API token and store it
    SetToken {
        /// The token; exactly one is expected
        #[arg(num_args = 0.., allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Show configuration and token state
    Status,
}
