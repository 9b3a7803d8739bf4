//! # Ocean Network Configuration
//!
//! Maps a network name (`mainnet`, `rinkeby`, `development`, ...) or chain id
//! to the endpoints and contract addresses a datatoken client needs.
//!
//! ```text
//!   "development" ──► built-in table ──► + address file (ADDRESS_FILE)
//!                                        + metadata store (AQUARIUS_URI)
//!                                        + Infura project id
//! ```

pub mod addresses;
pub mod error;
pub mod helper;
pub mod network;

pub use addresses::{AddressOverrides, ContractAddresses, ADDRESS_FILE_ENV, AQUARIUS_URI_ENV};
pub use error::{ConfigError, Result};
pub use helper::ConfigHelper;
pub use network::{NetworkConfig, NetworkSelector};
