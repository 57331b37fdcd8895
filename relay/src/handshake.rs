//! Token verification handshake
//!
//! A candidate token only becomes the active credential after the API
//! confirms it belongs to this server's address and port.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiError, RemoteApi};
use crate::credential::CredentialStore;
use crate::host::AddressLookup;

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("Token must not be empty")]
    EmptyToken,

    #[error("Could not determine public address: {0}")]
    Address(String),

    #[error("Server verification failed: {0}")]
    Verify(#[from] ApiError),

    #[error("Failed to store token: {0}")]
    Store(String),
}

impl HandshakeError {
    /// Short reason for the operator, preferring the server's own wording
    pub fn reason(&self) -> String {
        match self {
            HandshakeError::Verify(e) => match e.server_message() {
                Some(message) => message.to_string(),
                None => match e.status() {
                    Some(status) => format!("verification rejected (code {})", status),
                    None => e.to_string(),
                },
            },
            other => other.to_string(),
        }
    }
}

pub struct Handshake {
    api: Arc<dyn RemoteApi>,
    credentials: Arc<dyn CredentialStore>,
    address: Arc<dyn AddressLookup>,
    port: u16,
}

impl Handshake {
    pub fn new(
        api: Arc<dyn RemoteApi>,
        credentials: Arc<dyn CredentialStore>,
        address: Arc<dyn AddressLookup>,
        port: u16,
    ) -> Self {
        Self {
            api,
            credentials,
            address,
            port,
        }
    }

    /// Verify `candidate` against the API and persist it on success
    ///
    /// The stored credential is untouched on every failure path.
    pub async fn verify_and_store(&self, candidate: &str) -> Result<(), HandshakeError> {
        debug!(port = self.port, "Handshake::verify_and_store: called");
        // Stored exactly as supplied; only a blank candidate is refused.
        if candidate.trim().is_empty() {
            return Err(HandshakeError::EmptyToken);
        }

        let address = self
            .address
            .public_address()
            .await
            .map_err(|e| HandshakeError::Address(e.to_string()))?;
        debug!(%address, "Handshake::verify_and_store: resolved address");

        if let Err(e) = self.api.verify_server(candidate, &address, self.port).await {
            warn!(error = %e, %address, port = self.port, "Server verification failed");
            return Err(e.into());
        }

        self.credentials
            .set_token(candidate)
            .map_err(|e| HandshakeError::Store(e.to_string()))?;

        info!(%address, port = self.port, "Server API token verified and stored");
        Ok(())
    }
}
