//! ERC721 factory: creates data NFTs

use crate::abi;
use crate::client::EthClient;
use crate::error::{ContractError, Result};
use alloy_primitives::{Address, U256};
use ocean_config::NetworkConfig;
use tracing::info;

/// Token URI given to NFTs created without one
pub const DEFAULT_TOKEN_URI: &str = "https://oceanprotocol.com/nft/";

/// Wrapper around a deployed ERC721 factory
#[derive(Clone)]
pub struct NftFactory {
    client: EthClient,
    address: Address,
}

impl NftFactory {
    pub fn new(client: EthClient, address: Address) -> Self {
        Self { client, address }
    }

    /// Factory named by `config.factory_address`
    pub fn from_config(client: EthClient, config: &NetworkConfig) -> Result<Self> {
        let raw = config
            .factory_address
            .as_deref()
            .ok_or(ContractError::MissingAddress("factory"))?;
        let address = raw
            .parse()
            .map_err(|_| ContractError::InvalidAddress(raw.to_string()))?;
        Ok(Self::new(client, address))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn deploy_call(name: &str, symbol: &str, template_index: u64) -> abi::deployERC721ContractCall {
        abi::deployERC721ContractCall {
            name: name.to_string(),
            symbol: symbol.to_string(),
            _templateIndex: U256::from(template_index),
            additionalERC20Deployer: Address::ZERO,
            _tokenURI: DEFAULT_TOKEN_URI.to_string(),
        }
    }

    /// Create a data NFT owned by `owner` and return its address
    pub async fn create_nft(
        &self,
        owner: Address,
        name: &str,
        symbol: &str,
        template_index: u64,
    ) -> Result<Address> {
        let call = Self::deploy_call(name, symbol, template_index);
        let receipt = self.client.send(owner, self.address, &call).await?;

        let event = receipt
            .decode_event::<abi::NFTCreated>()
            .ok_or(ContractError::MissingEvent("NFTCreated"))?;

        info!(nft = %event.newTokenAddress, %owner, name, "Data NFT created");
        Ok(event.newTokenAddress)
    }

    pub async fn estimate_create_nft(
        &self,
        owner: Address,
        name: &str,
        symbol: &str,
        template_index: u64,
    ) -> Result<u64> {
        let call = Self::deploy_call(name, symbol, template_index);
        self.client.estimate_gas(owner, self.address, &call).await
    }

    /// Number of NFTs created through this factory
    pub async fn current_nft_count(&self) -> Result<U256> {
        let ret = self
            .client
            .call(self.address, &abi::getCurrentNFTCountCall {})
            .await?;
        Ok(ret._0)
    }

    /// Number of datatokens created through this factory's NFTs
    pub async fn current_token_count(&self) -> Result<U256> {
        let ret = self
            .client
            .call(self.address, &abi::getCurrentTokenCountCall {})
            .await?;
        Ok(ret._0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{RpcError, Transport};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn request(&self, _method: &str, _params: Value) -> std::result::Result<Value, RpcError> {
            Err(RpcError::ConnectionFailed("unreachable".into()))
        }
    }

    fn client() -> EthClient {
        EthClient::new(Arc::new(Unreachable))
    }

    #[test]
    fn test_from_config_requires_factory() {
        let err = NftFactory::from_config(client(), &NetworkConfig::development())
            .err()
            .unwrap();
        assert!(matches!(err, ContractError::MissingAddress("factory")));
    }

    #[test]
    fn test_from_config_rejects_short_address() {
        // mainnet carries a placeholder factory address
        let err = NftFactory::from_config(client(), &NetworkConfig::mainnet())
            .err()
            .unwrap();
        assert!(matches!(err, ContractError::InvalidAddress(ref a) if a == "0x1234"));
    }

    #[test]
    fn test_from_config() {
        let factory = NftFactory::from_config(client(), &NetworkConfig::rinkeby()).unwrap();
        assert_eq!(
            factory.address(),
            "0x3fd7A00106038Fb5c802c6d63fa7147Fe429E83a".parse::<Address>().unwrap()
        );
    }

    #[tokio::test]
    async fn test_connection_failure_is_relayed() {
        let factory = NftFactory::new(client(), Address::with_last_byte(9));
        let err = factory.current_nft_count().await.unwrap_err();
        assert!(err.is_recoverable());
    }
}
