//! Wiring of the relay from configuration

use std::path::Path;
use std::sync::Arc;

use eyre::{Context, Result};
use tracing::{debug, warn};

use crate::api::{HttpApiClient, RemoteApi};
use crate::config::Config;
use crate::credential::{CredentialStore, FileCredentialStore};
use crate::dispatch::Dispatcher;
use crate::handshake::Handshake;
use crate::host::{AddressLookup, CommandSink, HttpAddressLookup, LogSink, ProcessSink, RosterFile, StaticAddress};
use crate::scheduler::Poller;

/// Fully assembled relay
pub struct Relay {
    pub config: Config,
    pub credentials: Arc<FileCredentialStore>,
    pub poller: Arc<Poller>,
    pub handshake: Handshake,
}

impl Relay {
    pub fn from_config(config: Config) -> Result<Self> {
        debug!("Relay::from_config: called");
        config.validate()?;

        let credentials = Arc::new(
            FileCredentialStore::open(config.credentials_path()).context("Failed to open credential store")?,
        );
        if credentials.is_placeholder() {
            warn!(
                path = %credentials.path().display(),
                "No server API token configured yet; use `cmdrelay set-token <API_KEY>`"
            );
        }

        let api: Arc<dyn RemoteApi> = Arc::new(
            HttpApiClient::from_config(&config.api, credentials.clone()).context("Failed to build API client")?,
        );

        let sink: Arc<dyn CommandSink> = match &config.host.exec_program {
            Some(program) => {
                debug!(%program, "Relay::from_config: using process sink");
                Arc::new(ProcessSink::new(
                    program.clone(),
                    config.host.exec_args.clone(),
                    config.host.exec_timeout(),
                ))
            }
            None => {
                warn!("host.exec-program not set; commands will only be logged");
                Arc::new(LogSink)
            }
        };

        let players = Arc::new(RosterFile::new(config.host.roster_path.clone()));
        let dispatcher = Dispatcher::new(api.clone(), players, sink);
        let poller = Arc::new(Poller::new(api.clone(), dispatcher, config.poll.clone()));

        let address: Arc<dyn AddressLookup> = match &config.server.address {
            Some(address) => Arc::new(StaticAddress(address.clone())),
            None => Arc::new(HttpAddressLookup::new(
                config.server.ip_lookup_url.clone(),
                config.api.timeout(),
            )?),
        };
        let handshake = Handshake::new(api, credentials.clone(), address, config.server.port);

        Ok(Self {
            config,
            credentials,
            poller,
            handshake,
        })
    }

    /// Labelled status rows for the `status` command
    pub fn status(&self, config_path: Option<&Path>) -> Vec<(&'static str, String)> {
        let token = if self.credentials.is_placeholder() {
            "not set"
        } else {
            "configured"
        };

        vec![
            (
                "Config",
                config_path
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(defaults)".to_string()),
            ),
            ("API", self.config.api.base_url.clone()),
            ("Platform", self.config.api.platform.clone()),
            (
                "Poll",
                format!(
                    "every {}s (min {}s)",
                    self.config.poll.interval_secs, self.config.poll.min_interval_secs
                ),
            ),
            ("Token", format!("{} ({})", token, self.credentials.path().display())),
            ("Roster", self.config.host.roster_path.display().to_string()),
            (
                "Exec program",
                self.config
                    .host
                    .exec_program
                    .clone()
                    .unwrap_or_else(|| "(dry run)".to_string()),
            ),
        ]
    }
}
