//! # Data NFT (ERC721 template) wrapper
//!
//! Stateless proxy over the ERC721 template. Each method builds one contract
//! call, sends it, and relays the contract's answer. Authorization is decided
//! by the contract: owner-only manager grants, manager-only role grants, and
//! the permission reset on transfer all happen on chain.
//!
//! | Role | Grant | Revoke |
//! |------|-------|--------|
//! | Manager | `addManager` | `removeManager` |
//! | ERC20 deployer | `addToCreateERC20List` | `removeFromCreateERC20List` |
//! | Metadata updater | `addToMetadataList` | `removeFromMetadataList` |
//! | Store updater | `addTo725StoreList` | `removeFrom725StoreList` |

use crate::abi;
use crate::client::{EthClient, TxReceipt};
use crate::error::{ContractError, Result};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Token id of the single token every data NFT holds
pub const NFT_TOKEN_ID: u64 = 1;

/// Permissions an account holds on a data NFT
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftPermissions {
    pub manager: bool,
    #[serde(rename = "deployERC20")]
    pub deploy_erc20: bool,
    pub update_metadata: bool,
    pub store: bool,
}

impl From<abi::Roles> for NftPermissions {
    fn from(roles: abi::Roles) -> Self {
        Self {
            manager: roles.manager,
            deploy_erc20: roles.deployERC20,
            update_metadata: roles.updateMetadata,
            store: roles.store,
        }
    }
}

/// Grantable role on a data NFT
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PermissionRole {
    Manager,
    Erc20Deployer,
    MetadataUpdater,
    StoreUpdater,
}

impl PermissionRole {
    pub const ALL: [PermissionRole; 4] = [
        Self::Manager,
        Self::Erc20Deployer,
        Self::MetadataUpdater,
        Self::StoreUpdater,
    ];

    /// Whether `permissions` includes this role
    pub fn is_held(&self, permissions: &NftPermissions) -> bool {
        match self {
            Self::Manager => permissions.manager,
            Self::Erc20Deployer => permissions.deploy_erc20,
            Self::MetadataUpdater => permissions.update_metadata,
            Self::StoreUpdater => permissions.store,
        }
    }

    /// Calldata and signature of the grant call
    fn grant_call(&self, target: Address) -> (Vec<u8>, &'static str) {
        match self {
            Self::Manager => encode(abi::addManagerCall { _managerAddress: target }),
            Self::Erc20Deployer => encode(abi::addToCreateERC20ListCall { _allowedAddress: target }),
            Self::MetadataUpdater => encode(abi::addToMetadataListCall { _allowedAddress: target }),
            Self::StoreUpdater => encode(abi::addTo725StoreListCall { _allowedAddress: target }),
        }
    }

    /// Calldata and signature of the revoke call
    fn revoke_call(&self, target: Address) -> (Vec<u8>, &'static str) {
        match self {
            Self::Manager => encode(abi::removeManagerCall { _managerAddress: target }),
            Self::Erc20Deployer => {
                encode(abi::removeFromCreateERC20ListCall { _allowedAddress: target })
            }
            Self::MetadataUpdater => {
                encode(abi::removeFromMetadataListCall { _allowedAddress: target })
            }
            Self::StoreUpdater => encode(abi::removeFrom725StoreListCall { _allowedAddress: target }),
        }
    }
}

fn encode<C: SolCall>(call: C) -> (Vec<u8>, &'static str) {
    (call.abi_encode(), C::SIGNATURE)
}

impl fmt::Display for PermissionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Manager => "manager",
            Self::Erc20Deployer => "erc20-deployer",
            Self::MetadataUpdater => "metadata-updater",
            Self::StoreUpdater => "store-updater",
        })
    }
}

impl FromStr for PermissionRole {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.to_string() == s)
            .ok_or_else(|| {
                ContractError::InvalidArgument(format!(
                    "unknown role '{}', expected one of manager, erc20-deployer, metadata-updater, store-updater",
                    s
                ))
            })
    }
}

/// Arguments of `createERC20`
///
/// `cap` and `fee_amount` are in the token's smallest unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Erc20Params {
    pub template_index: u64,
    pub name: String,
    pub symbol: String,
    pub minter: Address,
    pub fee_manager: Address,
    pub market_fee_address: Address,
    pub fee_token: Address,
    pub cap: U256,
    pub fee_amount: U256,
}

impl Erc20Params {
    fn into_call(self) -> abi::createERC20Call {
        abi::createERC20Call {
            _templateIndex: U256::from(self.template_index),
            strings: vec![self.name, self.symbol],
            addresses: vec![
                self.minter,
                self.fee_manager,
                self.market_fee_address,
                self.fee_token,
            ],
            uints: vec![self.cap, self.fee_amount],
            bytess: vec![],
        }
    }
}

/// Wrapper around data NFTs deployed from the ERC721 template
///
/// The NFT address is passed per call, so one instance serves any number of
/// NFTs.
#[derive(Clone)]
pub struct NftDatatoken {
    client: EthClient,
}

impl NftDatatoken {
    pub fn new(client: EthClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &EthClient {
        &self.client
    }

    // ------------------------------------------------------------------
    // Permissions
    // ------------------------------------------------------------------

    /// Give `target` the `role` on `nft`, sending as `caller`
    pub async fn grant(
        &self,
        nft: Address,
        caller: Address,
        target: Address,
        role: PermissionRole,
    ) -> Result<TxReceipt> {
        let (data, label) = role.grant_call(target);
        let receipt = self.client.send_raw(caller, nft, data, label).await?;
        info!(%nft, %target, %role, "Role granted");
        Ok(receipt)
    }

    /// Take `role` on `nft` away from `target`, sending as `caller`
    pub async fn revoke(
        &self,
        nft: Address,
        caller: Address,
        target: Address,
        role: PermissionRole,
    ) -> Result<TxReceipt> {
        let (data, label) = role.revoke_call(target);
        let receipt = self.client.send_raw(caller, nft, data, label).await?;
        info!(%nft, %target, %role, "Role revoked");
        Ok(receipt)
    }

    pub async fn estimate_grant(
        &self,
        nft: Address,
        caller: Address,
        target: Address,
        role: PermissionRole,
    ) -> Result<u64> {
        let (data, _) = role.grant_call(target);
        self.client.estimate_gas_raw(caller, nft, data).await
    }

    pub async fn estimate_revoke(
        &self,
        nft: Address,
        caller: Address,
        target: Address,
        role: PermissionRole,
    ) -> Result<u64> {
        let (data, _) = role.revoke_call(target);
        self.client.estimate_gas_raw(caller, nft, data).await
    }

    pub async fn add_manager(&self, nft: Address, caller: Address, manager: Address) -> Result<TxReceipt> {
        self.grant(nft, caller, manager, PermissionRole::Manager).await
    }

    pub async fn remove_manager(&self, nft: Address, caller: Address, manager: Address) -> Result<TxReceipt> {
        self.revoke(nft, caller, manager, PermissionRole::Manager).await
    }

    pub async fn add_erc20_deployer(&self, nft: Address, caller: Address, deployer: Address) -> Result<TxReceipt> {
        self.grant(nft, caller, deployer, PermissionRole::Erc20Deployer).await
    }

    pub async fn remove_erc20_deployer(&self, nft: Address, caller: Address, deployer: Address) -> Result<TxReceipt> {
        self.revoke(nft, caller, deployer, PermissionRole::Erc20Deployer).await
    }

    pub async fn add_metadata_updater(&self, nft: Address, caller: Address, updater: Address) -> Result<TxReceipt> {
        self.grant(nft, caller, updater, PermissionRole::MetadataUpdater).await
    }

    pub async fn remove_metadata_updater(&self, nft: Address, caller: Address, updater: Address) -> Result<TxReceipt> {
        self.revoke(nft, caller, updater, PermissionRole::MetadataUpdater).await
    }

    pub async fn add_store_updater(&self, nft: Address, caller: Address, updater: Address) -> Result<TxReceipt> {
        self.grant(nft, caller, updater, PermissionRole::StoreUpdater).await
    }

    pub async fn remove_store_updater(&self, nft: Address, caller: Address, updater: Address) -> Result<TxReceipt> {
        self.revoke(nft, caller, updater, PermissionRole::StoreUpdater).await
    }

    /// Clear every permission on `nft`, including the owner's manager role
    pub async fn clean_permissions(&self, nft: Address, caller: Address) -> Result<TxReceipt> {
        self.client
            .send(caller, nft, &abi::cleanPermissionsCall {})
            .await
    }

    pub async fn estimate_clean_permissions(&self, nft: Address, caller: Address) -> Result<u64> {
        self.client
            .estimate_gas(caller, nft, &abi::cleanPermissionsCall {})
            .await
    }

    pub async fn get_nft_permissions(&self, nft: Address, account: Address) -> Result<NftPermissions> {
        let ret = self
            .client
            .call(nft, &abi::getPermissionsCall { user: account })
            .await?;
        Ok(ret._0.into())
    }

    pub async fn is_erc20_deployer(&self, nft: Address, account: Address) -> Result<bool> {
        let ret = self
            .client
            .call(nft, &abi::isERC20DeployerCall { account })
            .await?;
        Ok(ret._0)
    }

    // ------------------------------------------------------------------
    // Ownership
    // ------------------------------------------------------------------

    /// Owner of the NFT's token
    pub async fn get_nft_owner(&self, nft: Address) -> Result<Address> {
        let ret = self
            .client
            .call(nft, &abi::ownerOfCall { tokenId: U256::from(NFT_TOKEN_ID) })
            .await?;
        Ok(ret._0)
    }

    /// Move token `token_id` from `from` to `to`; the contract resets all
    /// permissions and makes `to` a manager
    pub async fn transfer_nft(
        &self,
        nft: Address,
        from: Address,
        to: Address,
        token_id: u64,
    ) -> Result<TxReceipt> {
        let call = abi::transferFromCall {
            from,
            to,
            tokenId: U256::from(token_id),
        };
        let receipt = self.client.send(from, nft, &call).await?;
        info!(%nft, %from, %to, token_id, "NFT transferred");
        Ok(receipt)
    }

    pub async fn estimate_transfer_nft(
        &self,
        nft: Address,
        from: Address,
        to: Address,
        token_id: u64,
    ) -> Result<u64> {
        let call = abi::transferFromCall {
            from,
            to,
            tokenId: U256::from(token_id),
        };
        self.client.estimate_gas(from, nft, &call).await
    }

    /// Like [`transfer_nft`](Self::transfer_nft) but rejects receivers that
    /// cannot hold ERC721 tokens
    pub async fn safe_transfer_nft(
        &self,
        nft: Address,
        from: Address,
        to: Address,
        token_id: u64,
    ) -> Result<TxReceipt> {
        let call = abi::safeTransferFromCall {
            from,
            to,
            tokenId: U256::from(token_id),
        };
        let receipt = self.client.send(from, nft, &call).await?;
        info!(%nft, %from, %to, token_id, "NFT transferred (safe)");
        Ok(receipt)
    }

    // ------------------------------------------------------------------
    // Datatokens
    // ------------------------------------------------------------------

    /// Create an ERC20 datatoken from `nft` and return its address
    pub async fn create_erc20(&self, nft: Address, caller: Address, params: Erc20Params) -> Result<Address> {
        let receipt = self.client.send(caller, nft, &params.into_call()).await?;

        let event = receipt
            .decode_event::<abi::TokenCreated>()
            .ok_or(ContractError::MissingEvent("TokenCreated"))?;

        info!(%nft, token = %event.newTokenAddress, "Datatoken created");
        Ok(event.newTokenAddress)
    }

    pub async fn estimate_create_erc20(&self, nft: Address, caller: Address, params: Erc20Params) -> Result<u64> {
        self.client
            .estimate_gas(caller, nft, &params.into_call())
            .await
    }

    // ------------------------------------------------------------------
    // Metadata and key-value store
    // ------------------------------------------------------------------

    /// Write `value` under `key` in the NFT's store (store updaters only)
    pub async fn set_data(&self, nft: Address, caller: Address, key: B256, value: Bytes) -> Result<TxReceipt> {
        self.client
            .send(caller, nft, &abi::setNewDataCall { _key: key, _value: value })
            .await
    }

    pub async fn get_data(&self, nft: Address, key: B256) -> Result<Bytes> {
        let ret = self.client.call(nft, &abi::getDataCall { _key: key }).await?;
        Ok(ret._0)
    }

    /// Set the metadata state flag (metadata updaters only)
    pub async fn set_metadata_state(&self, nft: Address, caller: Address, state: u8) -> Result<TxReceipt> {
        self.client
            .send(caller, nft, &abi::setMetaDataStateCall { _metaDataState: state })
            .await
    }

    pub async fn set_token_uri(&self, nft: Address, caller: Address, token_id: u64, uri: &str) -> Result<TxReceipt> {
        let call = abi::setTokenURICall {
            tokenId: U256::from(token_id),
            _tokenURI: uri.to_string(),
        };
        self.client.send(caller, nft, &call).await
    }

    pub async fn get_token_uri(&self, nft: Address, token_id: u64) -> Result<String> {
        let ret = self
            .client
            .call(nft, &abi::tokenURICall { tokenId: U256::from(token_id) })
            .await?;
        Ok(ret._0)
    }

    pub async fn name(&self, nft: Address) -> Result<String> {
        Ok(self.client.call(nft, &abi::nameCall {}).await?._0)
    }

    pub async fn symbol(&self, nft: Address) -> Result<String> {
        Ok(self.client.call(nft, &abi::symbolCall {}).await?._0)
    }
}
