//! Game host collaborators
//!
//! The relay never talks to a game server directly. It resolves players,
//! runs commands and discovers its public address through these traits.

mod address;
mod roster;
mod sink;

use async_trait::async_trait;
use eyre::Result;
use serde::{Deserialize, Serialize};

pub use address::{HttpAddressLookup, StaticAddress};
pub use roster::{Roster, RosterFile};
pub use sink::{LogSink, ProcessSink};

/// A player known to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Currently connected
    #[serde(default, rename = "online")]
    pub connected: bool,
}

/// Resolves platform player ids
#[async_trait]
pub trait PlayerLookup: Send + Sync {
    /// `Ok(None)` when the host has never seen this player
    async fn find_player(&self, id: &str) -> Result<Option<Player>>;
}

/// Executes raw console commands
#[async_trait]
pub trait CommandSink: Send + Sync {
    async fn execute(&self, command: &str) -> Result<()>;
}

/// Discovers the address this server is reachable at
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn public_address(&self) -> Result<String>;
}
