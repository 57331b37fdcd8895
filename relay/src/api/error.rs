//! Remote API error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the remote command API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected status code {status}")]
    Status { status: u16 },

    #[error("Rejected with status {status}: {}", .message.as_deref().unwrap_or("no reason given"))]
    Rejected { status: u16, message: Option<String> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Map a reqwest failure, keeping timeouts distinguishable
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(timeout)
        } else {
            ApiError::Transport(err)
        }
    }

    /// HTTP status, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status } | ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Transport(_) | ApiError::Timeout(_) | ApiError::InvalidResponse(_) => None,
        }
    }

    /// True when no usable HTTP exchange happened
    ///
    /// Unparseable bodies count here: the cycle is skipped like a dropped connection.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(_) | ApiError::Timeout(_) | ApiError::InvalidResponse(_)
        )
    }

    /// Server supplied message for rejected verification requests
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
