//! cmdrelay - CLI entry point

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use cmdrelay::cli::{Cli, Command};
use cmdrelay::config::Config;
use cmdrelay::operator::{self, Reply};
use cmdrelay::Relay;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>, to_stderr: bool) -> Result<()> {
    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()));

    if to_stderr {
        builder.with_writer(std::io::stderr).init();
    } else {
        let log_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cmdrelay")
            .join("logs");

        fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

        let log_file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join("cmdrelay.log"))
            .context("Failed to open log file")?;

        builder.with_writer(log_file).with_ansi(false).init();
    }

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn print_reply(reply: &Reply) {
    for line in &reply.lines {
        if reply.success {
            println!("{}", line);
        } else {
            println!("{}", line.red());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let to_stderr = matches!(cli.command, Some(Command::Run { stderr: true }));
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref(), to_stderr)
        .context("Failed to setup logging")?;

    let config_path = Config::resolve_path(cli.config.as_ref());
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let relay = Relay::from_config(config)?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command.unwrap_or(Command::Run { stderr: false }) {
        Command::Run { .. } => cmd_run(&relay).await,
        Command::Force => {
            let reply = operator::force(&relay.poller).await;
            print_reply(&reply);
            Ok(())
        }
        Command::SetToken { args } => {
            let reply = operator::set_token(&relay.handshake, &args).await;
            print_reply(&reply);
            reply.into_result()
        }
        Command::Status => {
            cmd_status(&relay, config_path.as_deref());
            Ok(())
        }
    }
}

async fn cmd_run(relay: &Relay) -> Result<()> {
    println!(
        "{} polling {} every {}s (Ctrl-C to stop)",
        "cmdrelay".green().bold(),
        relay.config.api.base_url.cyan(),
        relay.config.poll.interval_secs
    );

    #[cfg(unix)]
    spawn_force_on_signal(relay.poller.clone())?;

    relay
        .poller
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    Ok(())
}

/// SIGUSR1 acts as the operator force trigger while running as a daemon
#[cfg(unix)]
fn spawn_force_on_signal(poller: std::sync::Arc<cmdrelay::scheduler::Poller>) -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut usr1 = signal(SignalKind::user_defined1()).context("Failed to install SIGUSR1 handler")?;
    tokio::spawn(async move {
        while usr1.recv().await.is_some() {
            info!("SIGUSR1 received, forcing poll");
            let reply = operator::force(&poller).await;
            for line in reply.lines {
                info!("{}", line);
            }
        }
    });
    Ok(())
}

fn cmd_status(relay: &Relay, config_path: Option<&Path>) {
    println!("{}", "cmdrelay status".bold());
    for (label, value) in relay.status(config_path) {
        let value = match (label, value.as_str()) {
            ("Token", v) if v.starts_with("not set") => v.yellow(),
            ("Token", v) => v.green(),
            (_, v) => v.normal(),
        };
        println!("  {:<14}{}", format!("{}:", label), value);
    }
}
