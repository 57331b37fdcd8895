//! HTTP implementation of the remote command API

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{encode_ids, parse_error_message, parse_queue};
use super::{ApiError, CommandEntry, RemoteApi};
use crate::config::ApiConfig;
use crate::credential::CredentialStore;

/// reqwest-backed client
///
/// The stored token is read on every request, so a token swapped in by the
/// verification handshake applies from the next call on.
pub struct HttpApiClient {
    base_url: String,
    platform: String,
    http: Client,
    timeout: Duration,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpApiClient {
    /// Create a new client from configuration
    pub fn from_config(config: &ApiConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        debug!(?config, "from_config: called");
        let timeout = config.timeout();
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cmdrelay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            platform: config.platform.clone(),
            http,
            timeout,
            credentials,
        })
    }

    fn queue_url(&self) -> String {
        format!("{}/v2/commands/queue/{}", self.base_url, self.platform)
    }

    fn verify_url(&self) -> String {
        format!("{}/v2/server-verify/{}", self.base_url, self.platform)
    }

    fn complete_url(&self) -> String {
        format!("{}/v2/commands/complete", self.base_url)
    }

    fn authorized(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header("Authorization", format!("Bearer {}", token))
    }
}

#[async_trait]
impl RemoteApi for HttpApiClient {
    async fn fetch_queue(&self) -> Result<Vec<CommandEntry>, ApiError> {
        let url = self.queue_url();
        debug!(%url, "fetch_queue: called");

        let token = self.credentials.token();
        let response = self
            .authorized(self.http.get(&url), &token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(%status, "fetch_queue: non-200 status");
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(e, self.timeout))?;

        let entries = parse_queue(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        debug!(count = entries.len(), "fetch_queue: parsed entries");
        Ok(entries)
    }

    async fn verify_server(&self, candidate: &str, address: &str, port: u16) -> Result<(), ApiError> {
        let url = self.verify_url();
        debug!(%url, %address, %port, "verify_server: called");

        let port = port.to_string();
        let response = self
            .authorized(self.http.post(&url), candidate)
            .header("Accept", "application/json")
            .form(&[("address", address), ("port", port.as_str())])
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if status == StatusCode::OK {
            debug!("verify_server: accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = parse_error_message(&body);
        debug!(%status, ?message, "verify_server: rejected");
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn acknowledge(&self, ids: &[i64]) -> Result<(), ApiError> {
        let url = self.complete_url();
        debug!(%url, ?ids, "acknowledge: called");

        let token = self.credentials.token();
        let response = self
            .authorized(self.http.post(&url), &token)
            .form(&[("ids", encode_ids(ids))])
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(e, self.timeout))?;

        // Status is informational only; the queue re-offers anything not removed.
        let status = response.status();
        if status.is_success() {
            debug!(%status, "acknowledge: done");
        } else {
            warn!(%status, "acknowledge: server did not accept acknowledgment");
        }
        Ok(())
    }
}
