//! Network configuration resolver

use crate::addresses::{
    default_address_file, load_contract_addresses, AddressOverrides, ADDRESS_FILE_ENV,
    AQUARIUS_URI_ENV, LOCAL_CHAIN_SECTION,
};
use crate::error::{ConfigError, Result};
use crate::network::{builtin_networks, NetworkConfig, NetworkSelector};
use std::path::PathBuf;
use tracing::{debug, error};

/// Resolves a network name or chain id to its [`NetworkConfig`]
///
/// The built-in table is static. When asked for `development` by name, the
/// record is completed from the contract address file of a local deployment
/// and its metadata store can be redirected with `AQUARIUS_URI`. Lookup by
/// chain id returns the table record untouched.
#[derive(Clone, Debug)]
pub struct ConfigHelper {
    networks: Vec<NetworkConfig>,
    address_file: Option<PathBuf>,
    aquarius_uri: Option<String>,
}

impl ConfigHelper {
    /// Helper with explicit overrides. Empty values count as unset.
    pub fn new(address_file: Option<PathBuf>, aquarius_uri: Option<String>) -> Self {
        Self {
            networks: builtin_networks(),
            address_file: address_file.filter(|p| !p.as_os_str().is_empty()),
            aquarius_uri: aquarius_uri.filter(|u| !u.is_empty()),
        }
    }

    /// Helper reading `ADDRESS_FILE` and `AQUARIUS_URI` from the process environment
    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os(ADDRESS_FILE_ENV).map(PathBuf::from),
            std::env::var(AQUARIUS_URI_ENV).ok(),
        )
    }

    pub fn networks(&self) -> &[NetworkConfig] {
        &self.networks
    }

    /// Address file in effect: the explicit one, else the default location
    pub fn address_file(&self) -> Option<PathBuf> {
        self.address_file.clone().or_else(default_address_file)
    }

    /// Contract addresses of the local deployment, or `None` (logged) when
    /// the address file cannot be used
    pub fn addresses_from_env(&self) -> Option<AddressOverrides> {
        match self.load_overrides() {
            Ok(overrides) => Some(overrides),
            Err(e) => {
                error!("Could not load local contract address file: {}", e);
                None
            }
        }
    }

    fn load_overrides(&self) -> Result<AddressOverrides> {
        let path = self.address_file().ok_or(ConfigError::NoHomeDir)?;
        debug!(?path, "Loading contract addresses");
        let addresses = load_contract_addresses(&path, LOCAL_CHAIN_SECTION)?;
        Ok(AddressOverrides::new(addresses, self.aquarius_uri.clone()))
    }

    /// Resolve `network`, logging and returning `None` when it is unknown
    ///
    /// With an Infura project id the node URI becomes `{node_uri}/{id}`.
    pub fn get_config(
        &self,
        network: impl Into<NetworkSelector>,
        infura_project_id: Option<&str>,
    ) -> Option<NetworkConfig> {
        match self.try_get_config(network, infura_project_id) {
            Ok(config) => Some(config),
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    /// Same lookup as [`get_config`](Self::get_config) with a typed error
    pub fn try_get_config(
        &self,
        network: impl Into<NetworkSelector>,
        infura_project_id: Option<&str>,
    ) -> Result<NetworkConfig> {
        let selector = network.into();
        let mut config = self
            .networks
            .iter()
            .find(|c| selector.matches(c))
            .cloned()
            .ok_or_else(|| ConfigError::UnknownNetwork(selector.to_string()))?;

        if selector.is_development() {
            if let Some(overrides) = self.addresses_from_env() {
                overrides.apply(&mut config);
            }
        }

        if let Some(project_id) = infura_project_id.filter(|id| !id.is_empty()) {
            config.node_uri = format!("{}/{}", config.node_uri, project_id);
        }

        Ok(config)
    }
}

impl Default for ConfigHelper {
    fn default() -> Self {
        Self::from_env()
    }
}
