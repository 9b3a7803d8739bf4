//! Error types for network configuration lookup

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while resolving a network configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No built-in record matches the requested name or id
    #[error("No config found for given network '{0}'")]
    UnknownNetwork(String),

    /// The contract address file could not be read
    #[error("Could not read contract address file {path:?}: {source}")]
    AddressFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The contract address file is not valid JSON
    #[error("Could not parse contract address file: {0}")]
    AddressFileParse(#[from] serde_json::Error),

    /// The contract address file lacks the expected chain section
    #[error("Contract address file has no '{0}' section")]
    MissingSection(String),

    /// No explicit address file and no home directory to derive one from
    #[error("Home directory could not be determined")]
    NoHomeDir,
}

impl ConfigError {
    /// Error code for CLI exit statuses and structured logs
    pub fn code(&self) -> u32 {
        match self {
            Self::UnknownNetwork(_) => 2001,
            Self::AddressFileRead { .. } | Self::NoHomeDir => 2002,
            Self::AddressFileParse(_) | Self::MissingSection(_) => 2003,
        }
    }
}
