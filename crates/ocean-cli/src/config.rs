//! CLI configuration file
//!
//! ```toml
//! [network]
//! name = "rinkeby"
//! infura_project_id = "..."
//!
//! [rpc]
//! receipt_timeout_secs = 300
//!
//! [logging]
//! level = "debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete CLI configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Network selection
    #[serde(default)]
    pub network: NetworkSettings,

    /// Node connection
    #[serde(default)]
    pub rpc: RpcSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Parse `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("Config {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Which network to resolve and how
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Network name or chain id
    #[serde(default = "default_network")]
    pub name: String,

    /// Appended to Infura node URIs
    pub infura_project_id: Option<String>,

    /// Contract address file of a local deployment (overrides `ADDRESS_FILE`)
    pub address_file: Option<PathBuf>,

    /// Metadata store (overrides `AQUARIUS_URI`)
    pub aquarius_uri: Option<String>,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            name: default_network(),
            infura_project_id: None,
            address_file: None,
            aquarius_uri: None,
        }
    }
}

/// Node connection settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcSettings {
    /// Node URL, replaces the network's node URI
    pub url: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Interval between receipt polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Time to wait for a transaction to be mined
    #[serde(default = "default_receipt_timeout")]
    pub receipt_timeout_secs: u64,
}

impl RpcSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            url: None,
            request_timeout_secs: default_request_timeout(),
            poll_interval_ms: default_poll_interval(),
            receipt_timeout_secs: default_receipt_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_network() -> String {
    "development".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    500
}

fn default_receipt_timeout() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}
