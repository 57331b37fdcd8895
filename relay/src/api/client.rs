//! RemoteApi trait definition

use async_trait::async_trait;

use super::{ApiError, CommandEntry};

/// The three operations of the remote command API
///
/// Every call is a single attempt. Retrying is left to the next poll.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Fetch pending entries for this server, in queue order
    async fn fetch_queue(&self) -> Result<Vec<CommandEntry>, ApiError>;

    /// Check that `candidate` is a valid token bound to this server instance
    async fn verify_server(&self, candidate: &str, address: &str, port: u16) -> Result<(), ApiError>;

    /// Report executed entry ids
    async fn acknowledge(&self, ids: &[i64]) -> Result<(), ApiError>;
}
