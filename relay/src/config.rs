//! cmdrelay configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main cmdrelay configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote command API
    pub api: ApiConfig,

    /// Poll cadence
    pub poll: PollConfig,

    /// This game server instance, as reported during verification
    pub server: ServerConfig,

    /// Local stand-ins for the game host
    pub host: HostConfig,

    /// Where the bearer token is persisted
    #[serde(rename = "credentials-path")]
    pub credentials_path: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        if self.api.platform.trim().is_empty() {
            return Err(eyre::eyre!("api.platform must not be empty"));
        }
        if self.poll.interval_secs == 0 {
            return Err(eyre::eyre!("poll.interval-secs must be greater than zero"));
        }
        if self.api.timeout_ms == 0 {
            return Err(eyre::eyre!("api.timeout-ms must be greater than zero"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .cmdrelay.yml
        let local_config = PathBuf::from(".cmdrelay.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/cmdrelay/cmdrelay.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("cmdrelay").join("cmdrelay.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are ignored here; the full load reports them once logging is up.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::resolve_path(config_path)
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Config>(&content).ok())
            .and_then(|config| config.log_level)
    }

    /// The file `load` reads from, or `None` when defaults apply
    pub fn resolve_path(config_path: Option<&PathBuf>) -> Option<PathBuf> {
        if let Some(path) = config_path {
            return Some(path.clone());
        }

        let mut candidates = vec![PathBuf::from(".cmdrelay.yml")];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("cmdrelay").join("cmdrelay.yml"));
        }
        candidates.into_iter().find(|p| p.exists())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Resolved credential file location
    pub fn credentials_path(&self) -> PathBuf {
        self.credentials_path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("cmdrelay")
                .join("credentials.yml")
        })
    }
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API origin, without trailing slash
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Game platform path segment (queue and verify endpoints)
    pub platform: String,

    /// Per-request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.gamecms.org".to_string(),
            platform: "rust".to_string(),
            timeout_ms: 15_000,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Poll cadence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Timer period in seconds
    #[serde(rename = "interval-secs")]
    pub interval_secs: u64,

    /// Minimum time between two timer-driven fetches
    #[serde(rename = "min-interval-secs")]
    pub min_interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            min_interval_secs: 60,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.min_interval_secs)
    }
}

/// Game server identity used by the verification handshake
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Public address; discovered through `ip-lookup-url` when unset
    pub address: Option<String>,

    /// Game port
    pub port: u16,

    /// Plain-text IP echo service
    #[serde(rename = "ip-lookup-url")]
    pub ip_lookup_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: 28015,
            ip_lookup_url: "https://api.ipify.org".to_string(),
        }
    }
}

/// Host adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// YAML roster of known players and their online state
    #[serde(rename = "roster-path")]
    pub roster_path: PathBuf,

    /// Program that receives each raw command as its last argument.
    /// Commands are only logged when unset.
    #[serde(rename = "exec-program")]
    pub exec_program: Option<String>,

    /// Arguments placed before the command
    #[serde(rename = "exec-args")]
    pub exec_args: Vec<String>,

    /// Timeout for one command execution in milliseconds
    #[serde(rename = "exec-timeout-ms")]
    pub exec_timeout_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        let roster_path = dirs::data_local_dir()
            .map(|d| d.join("cmdrelay").join("roster.yml"))
            .unwrap_or_else(|| PathBuf::from("roster.yml"));

        Self {
            roster_path,
            exec_program: None,
            exec_args: vec![],
            exec_timeout_ms: 10_000,
        }
    }
}

impl HostConfig {
    pub fn exec_timeout(&self) -> Duration {
        Duration::from_millis(self.exec_timeout_ms)
    }
}
