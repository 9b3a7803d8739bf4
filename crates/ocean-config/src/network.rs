//! # Built-in Network Table
//!
//! Every network the client knows how to reach, keyed by name and chain id.
//!
//! | Network | Chain ID | Node | Contracts |
//! |---------|----------|------|-----------|
//! | unknown | - | local | none |
//! | development | 8996 | local (barge) | from the contract address file |
//! | rinkeby | 4 | Infura | full set |
//! | mainnet | 1 | Infura | factory + OCEAN token |

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CHAIN CONSTANTS
// ============================================================================

/// Ethereum mainnet
pub const CHAIN_ID_MAINNET: u64 = 1;

/// Rinkeby testnet
pub const CHAIN_ID_RINKEBY: u64 = 4;

/// Local barge / ganache chain
pub const CHAIN_ID_DEVELOPMENT: u64 = 8996;

pub const NETWORK_UNKNOWN: &str = "unknown";
pub const NETWORK_DEVELOPMENT: &str = "development";
pub const NETWORK_RINKEBY: &str = "rinkeby";
pub const NETWORK_MAINNET: &str = "mainnet";

// ============================================================================
// LOCAL SERVICES
// ============================================================================

/// Local node RPC
pub const LOCAL_NODE_URI: &str = "http://localhost:8545";

/// Local Aquarius metadata store
pub const LOCAL_METADATA_STORE_URI: &str = "http://127.0.0.1:5000";

/// Local provider service
pub const LOCAL_PROVIDER_URI: &str = "http://127.0.0.1:8030";

// ============================================================================
// NETWORK CONFIGURATION RECORD
// ============================================================================

/// Endpoints and contract addresses for one network
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Chain id, absent for the catch-all `unknown` record
    pub network_id: Option<u64>,

    /// Network name used for lookups
    pub network: String,

    /// JSON-RPC endpoint of the node
    pub node_uri: String,

    /// ERC721 factory contract
    pub factory_address: Option<String>,

    /// OCEAN token contract
    pub ocean_token_address: Option<String>,

    /// Aquarius metadata store
    pub metadata_store_uri: Option<String>,

    /// Provider service
    pub provider_uri: Option<String>,

    /// Pool factory contract
    pub pool_factory_address: Option<String>,

    /// Fixed rate exchange contract
    pub fixed_rate_exchange_address: Option<String>,

    /// Metadata contract
    pub metadata_contract_address: Option<String>,
}

impl NetworkConfig {
    /// Catch-all record pointing at local services
    pub fn unknown() -> Self {
        Self {
            network_id: None,
            network: NETWORK_UNKNOWN.to_string(),
            ..Self::local()
        }
    }

    /// Local barge deployment; contract addresses come from the address file
    pub fn development() -> Self {
        Self {
            network_id: Some(CHAIN_ID_DEVELOPMENT),
            network: NETWORK_DEVELOPMENT.to_string(),
            ..Self::local()
        }
    }

    pub fn rinkeby() -> Self {
        Self {
            network_id: Some(CHAIN_ID_RINKEBY),
            network: NETWORK_RINKEBY.to_string(),
            node_uri: "https://rinkeby.infura.io/v3".to_string(),
            factory_address: Some("0x3fd7A00106038Fb5c802c6d63fa7147Fe429E83a".to_string()),
            ocean_token_address: Some("0x8967BCF84170c91B0d24D4302C2376283b0B3a07".to_string()),
            metadata_store_uri: Some("https://aquarius.rinkeby.v3.dev-ocean.com".to_string()),
            provider_uri: Some("https://provider.rinkeby.v3.dev-ocean.com".to_string()),
            pool_factory_address: Some("0x53eDF9289B0898e1652Ce009AACf8D25fA9A42F8".to_string()),
            fixed_rate_exchange_address: Some(
                "0xeD1DfC5F3a589CfC4E8B91C1fbfC18FC6699Fbde".to_string(),
            ),
            metadata_contract_address: Some(
                "0x2C63bf697f74C72CFB727Fb5eB8e6266cE341e13".to_string(),
            ),
        }
    }

    pub fn mainnet() -> Self {
        Self {
            network_id: Some(CHAIN_ID_MAINNET),
            network: NETWORK_MAINNET.to_string(),
            node_uri: "https://mainnet.infura.io/v3".to_string(),
            factory_address: Some("0x1234".to_string()),
            ocean_token_address: Some("0x7AFeBBB46fDb47ed17b22ed075Cde2447694fB9e".to_string()),
            metadata_store_uri: None,
            provider_uri: None,
            pool_factory_address: None,
            fixed_rate_exchange_address: None,
            metadata_contract_address: None,
        }
    }

    /// Shared shape of the two local records
    fn local() -> Self {
        Self {
            network_id: None,
            network: String::new(),
            node_uri: LOCAL_NODE_URI.to_string(),
            factory_address: None,
            ocean_token_address: None,
            metadata_store_uri: Some(LOCAL_METADATA_STORE_URI.to_string()),
            provider_uri: Some(LOCAL_PROVIDER_URI.to_string()),
            pool_factory_address: None,
            fixed_rate_exchange_address: None,
            metadata_contract_address: None,
        }
    }
}

/// All built-in records, in lookup order
pub fn builtin_networks() -> Vec<NetworkConfig> {
    vec![
        NetworkConfig::unknown(),
        NetworkConfig::development(),
        NetworkConfig::rinkeby(),
        NetworkConfig::mainnet(),
    ]
}

// ============================================================================
// NETWORK SELECTOR
// ============================================================================

/// Key used to find a network record: its name or its chain id
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NetworkSelector {
    Name(String),
    Id(u64),
}

impl NetworkSelector {
    /// Parse user input: all-digit strings select by id, anything else by name
    pub fn parse(input: &str) -> Self {
        match input.parse::<u64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Name(input.to_string()),
        }
    }

    /// Whether this selects `development` by name; lookups by chain id do not count
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Name(name) if name == NETWORK_DEVELOPMENT)
    }

    /// Whether `config` is the record this selector names
    pub fn matches(&self, config: &NetworkConfig) -> bool {
        match self {
            Self::Name(name) => config.network == *name,
            Self::Id(id) => config.network_id == Some(*id),
        }
    }
}

impl From<&str> for NetworkSelector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for NetworkSelector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<u64> for NetworkSelector {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl fmt::Display for NetworkSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Id(id) => write!(f, "{}", id),
        }
    }
}
