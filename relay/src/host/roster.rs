//! Player roster kept in a YAML file

use async_trait::async_trait;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use super::{Player, PlayerLookup};

/// Players the host has seen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Roster {
    pub players: Vec<Player>,
}

impl Roster {
    pub fn find(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }
}

/// Roster file maintained by the game host
///
/// Re-read on every lookup; a missing file is an empty roster.
pub struct RosterFile {
    path: PathBuf,
}

impl RosterFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<Roster> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => serde_yaml::from_str(&content)
                .context(format!("Failed to parse roster {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "RosterFile::load: no roster file");
                Ok(Roster::default())
            }
            Err(e) => Err(e).context(format!("Failed to read roster {}", self.path.display())),
        }
    }
}

#[async_trait]
impl PlayerLookup for RosterFile {
    async fn find_player(&self, id: &str) -> Result<Option<Player>> {
        debug!(%id, "RosterFile::find_player: called");
        let roster = self.load().await?;
        Ok(roster.find(id).cloned())
    }
}
