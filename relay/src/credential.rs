//! Bearer token storage
//!
//! The token is the only state that survives a restart. Readers always see
//! a complete value: writes swap the whole string under a lock.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

/// Value written on first run, before an operator supplies a real token
pub const PLACEHOLDER_TOKEN: &str = "<Your Server API Token Here>";

/// Holds the active API token
pub trait CredentialStore: Send + Sync {
    /// Current token
    fn token(&self) -> String;

    /// Replace and persist the token
    fn set_token(&self, token: &str) -> Result<()>;

    /// True until a real token has been stored
    fn is_placeholder(&self) -> bool {
        self.token() == PLACEHOLDER_TOKEN
    }
}

/// On-disk credential file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialFile {
    #[serde(rename = "server-api-token")]
    pub server_api_token: String,
}

impl Default for CredentialFile {
    fn default() -> Self {
        Self {
            server_api_token: PLACEHOLDER_TOKEN.to_string(),
        }
    }
}

impl CredentialFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content).context(format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create credential directory")?;
        }
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).context(format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Token persisted as a YAML file
pub struct FileCredentialStore {
    path: PathBuf,
    token: RwLock<String>,
}

impl FileCredentialStore {
    /// Open the credential file, creating it with the placeholder when missing
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!(path = %path.display(), "FileCredentialStore::open: called");

        let file = if path.exists() {
            CredentialFile::load(&path)?
        } else {
            info!(path = %path.display(), "Creating a new credential file");
            let file = CredentialFile::default();
            file.save(&path)?;
            file
        };

        Ok(Self {
            path,
            token: RwLock::new(file.server_api_token),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn token(&self) -> String {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_token(&self, token: &str) -> Result<()> {
        debug!(path = %self.path.display(), "FileCredentialStore::set_token: called");
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        CredentialFile {
            server_api_token: token.to_string(),
        }
        .save(&self.path)?;
        *guard = token.to_string();
        Ok(())
    }
}

/// Token held only in memory
pub struct MemoryCredentialStore {
    token: RwLock<String>,
}

impl MemoryCredentialStore {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(token.into()),
        }
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new(PLACEHOLDER_TOKEN)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn token(&self) -> String {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_token(&self, token: &str) -> Result<()> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token.to_string();
        Ok(())
    }
}
