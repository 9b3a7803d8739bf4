//! Contract address file produced by the contracts deployment
//!
//! The file maps chain names to the addresses of the contracts deployed there.
//! Only the local `ganache` section is consumed; it backs the `development`
//! network.

use crate::error::{ConfigError, Result};
use crate::network::NetworkConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable naming the address file
pub const ADDRESS_FILE_ENV: &str = "ADDRESS_FILE";

/// Environment variable overriding the metadata store URI
pub const AQUARIUS_URI_ENV: &str = "AQUARIUS_URI";

/// Section of the address file describing the local chain
pub const LOCAL_CHAIN_SECTION: &str = "ganache";

/// `~/.ocean/ocean-contracts/artifacts/address.json`
pub fn default_address_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(".ocean")
            .join("ocean-contracts")
            .join("artifacts")
            .join("address.json")
    })
}

/// Addresses of one chain section. Unknown keys are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ContractAddresses {
    #[serde(rename = "DTFactory", default)]
    pub dt_factory: Option<String>,

    #[serde(rename = "BFactory", default)]
    pub b_factory: Option<String>,

    #[serde(rename = "FixedRateExchange", default)]
    pub fixed_rate_exchange: Option<String>,

    #[serde(rename = "Metadata", default)]
    pub metadata: Option<String>,
}

/// Read `path` and return the addresses of `section`
pub fn load_contract_addresses(path: &Path, section: &str) -> Result<ContractAddresses> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::AddressFileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut sections: HashMap<String, serde_json::Value> = serde_json::from_str(&content)?;
    let section_value = sections
        .remove(section)
        .ok_or_else(|| ConfigError::MissingSection(section.to_string()))?;

    Ok(serde_json::from_value(section_value)?)
}

/// Fields of a [`NetworkConfig`] replaced by the local deployment
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressOverrides {
    pub factory_address: Option<String>,
    pub pool_factory_address: Option<String>,
    pub fixed_rate_exchange_address: Option<String>,
    pub metadata_contract_address: Option<String>,

    /// Only replaces the record's value when set
    pub metadata_store_uri: Option<String>,
}

impl AddressOverrides {
    pub fn new(addresses: ContractAddresses, metadata_store_uri: Option<String>) -> Self {
        Self {
            factory_address: addresses.dt_factory,
            pool_factory_address: addresses.b_factory,
            fixed_rate_exchange_address: addresses.fixed_rate_exchange,
            metadata_contract_address: addresses.metadata,
            metadata_store_uri,
        }
    }

    /// Overlay onto `config`. Contract addresses always replace the record's
    /// values, the metadata store URI only when one was given.
    pub fn apply(self, config: &mut NetworkConfig) {
        config.factory_address = self.factory_address;
        config.pool_factory_address = self.pool_factory_address;
        config.fixed_rate_exchange_address = self.fixed_rate_exchange_address;
        config.metadata_contract_address = self.metadata_contract_address;
        if let Some(uri) = self.metadata_store_uri {
            config.metadata_store_uri = Some(uri);
        }
    }
}
