//! Command execution sinks

use async_trait::async_trait;
use eyre::{Result, eyre};
use std::time::Duration;
use tracing::{debug, info};

use super::CommandSink;

/// Runs a program with the raw command as its final argument
///
/// Typically an RCON client. The command text is passed through untouched.
pub struct ProcessSink {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessSink {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

#[async_trait]
impl CommandSink for ProcessSink {
    async fn execute(&self, command: &str) -> Result<()> {
        debug!(program = %self.program, %command, "ProcessSink::execute: called");

        let output = match tokio::time::timeout(
            self.timeout,
            tokio::process::Command::new(&self.program)
                .args(&self.args)
                .arg(command)
                .kill_on_drop(true)
                .output(),
        )
        .await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                debug!(%e, "ProcessSink::execute: failed to spawn");
                return Err(eyre!("Failed to run {}: {}", self.program, e));
            }
            Err(_) => {
                debug!("ProcessSink::execute: timed out");
                return Err(eyre!("{} timed out after {:?}", self.program, self.timeout));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(eyre!("{} exited with {}: {}", self.program, output.status, stderr.trim()));
        }

        debug!("ProcessSink::execute: done");
        Ok(())
    }
}

/// Logs commands without running them
pub struct LogSink;

#[async_trait]
impl CommandSink for LogSink {
    async fn execute(&self, command: &str) -> Result<()> {
        info!(%command, "Command (dry run)");
        Ok(())
    }
}
