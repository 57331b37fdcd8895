//! Operator triggers and their replies

use tracing::{debug, error};

use crate::handshake::Handshake;
use crate::scheduler::Poller;

pub const MESSAGE_PREFIX: &str = "[cmdrelay] ";

/// Lines sent back to whoever invoked a trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub success: bool,
}

impl Reply {
    fn ok(lines: Vec<String>) -> Self {
        Self { lines, success: true }
    }

    fn failed(lines: Vec<String>) -> Self {
        Self { lines, success: false }
    }

    /// Turn a failed reply into an error for callers that propagate with `?`
    pub fn into_result(self) -> eyre::Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(eyre::eyre!(
                "{}",
                self.lines.last().map(String::as_str).unwrap_or("operator command failed")
            ))
        }
    }
}

fn prefixed(text: impl AsRef<str>) -> String {
    format!("{}{}", MESSAGE_PREFIX, text.as_ref())
}

/// Run one cycle immediately
pub async fn force(poller: &Poller) -> Reply {
    debug!("operator::force: called");
    let mut lines = vec![prefixed("Forcing command execution...")];

    match poller.force().await {
        Ok(report) => {
            lines.push(prefixed(format!(
                "Executed {} command entries.",
                report.executed_count()
            )));
            Reply::ok(lines)
        }
        Err(e) => {
            error!(error = %e, "Error in force trigger");
            lines.push(prefixed(format!("Error executing command: {}", e)));
            Reply::failed(lines)
        }
    }
}

/// Verify and store a new token; expects exactly one argument
pub async fn set_token(handshake: &Handshake, args: &[String]) -> Reply {
    debug!(argc = args.len(), "operator::set_token: called");
    let [candidate] = args else {
        return Reply::failed(vec![prefixed("Usage: set-token <API_KEY>")]);
    };

    match handshake.verify_and_store(candidate).await {
        Ok(()) => Reply::ok(vec![prefixed("Server API Key updated successfully.")]),
        Err(e) => Reply::failed(vec![prefixed(format!("Server verification failed: {}", e.reason()))]),
    }
}
