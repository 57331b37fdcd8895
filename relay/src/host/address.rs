//! Public address discovery

use async_trait::async_trait;
use eyre::{Context, Result, eyre};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::AddressLookup;

/// Operator configured address
pub struct StaticAddress(pub String);

#[async_trait]
impl AddressLookup for StaticAddress {
    async fn public_address(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Asks a plain-text IP echo service
pub struct HttpAddressLookup {
    url: String,
    http: Client,
}

impl HttpAddressLookup {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { url: url.into(), http })
    }
}

#[async_trait]
impl AddressLookup for HttpAddressLookup {
    async fn public_address(&self) -> Result<String> {
        debug!(url = %self.url, "HttpAddressLookup::public_address: called");
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("IP lookup request failed")?;

        if !response.status().is_success() {
            return Err(eyre!("IP lookup returned status {}", response.status()));
        }

        let body = response.text().await.context("IP lookup body unreadable")?;
        parse_address(&body)
    }
}

fn parse_address(body: &str) -> Result<String> {
    let address = body.trim();
    if address.is_empty() || address.contains(char::is_whitespace) {
        return Err(eyre!("IP lookup returned an unusable body"));
    }
    Ok(address.to_string())
}
