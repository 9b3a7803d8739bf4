//! In-memory JSON-RPC node hosting an ERC721 factory and its data NFTs
//!
//! Authorization follows the ERC721 template: the owner grants and revokes
//! managers, managers grant and revoke the other roles, and a transfer wipes
//! every permission before making the receiver a manager.

#![allow(dead_code)]

use alloy_primitives::{keccak256, Address, Bytes, LogData, B256, U256};
use alloy_sol_types::{Revert, SolCall, SolError, SolEvent};
use async_trait::async_trait;
use ocean_contracts::abi::*;
use ocean_contracts::{EthClient, RpcError, Transport};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const NOT_OWNER: &str = "Caller is not NFT Owner";
pub const NOT_MANAGER: &str = "Caller is not Manager";
pub const NOT_DEPLOYER: &str = "Caller is not ERC20Deployer";
pub const NOT_METADATA_UPDATER: &str = "Caller is not Metadata Updater";
pub const NOT_STORE_UPDATER: &str = "Caller is not Store Updater";

const ESTIMATED_GAS: &str = "0x30d40";

#[derive(Clone, Copy, Default)]
struct Flags {
    manager: bool,
    deploy_erc20: bool,
    update_metadata: bool,
    store: bool,
}

#[derive(Clone)]
struct NftState {
    name: String,
    symbol: String,
    owner: Address,
    token_uri: String,
    metadata_state: u8,
    roles: HashMap<Address, Flags>,
    data: HashMap<B256, Bytes>,
}

impl NftState {
    fn flags(&mut self, account: Address) -> &mut Flags {
        self.roles.entry(account).or_default()
    }

    fn has(&self, account: Address, pick: fn(&Flags) -> bool) -> bool {
        self.roles.get(&account).map_or(false, pick)
    }
}

#[derive(Clone)]
struct ChainState {
    factory: Address,
    nfts: HashMap<Address, NftState>,
    token_count: u64,
    nonce: u64,
}

type Outcome = Result<(Vec<u8>, Vec<LogData>), String>;

fn require(condition: bool, reason: &str) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(reason.to_string())
    }
}

fn decode<C: SolCall>(data: &[u8]) -> Result<C, String> {
    C::abi_decode(data, true).map_err(|e| e.to_string())
}

fn derive_address(kind: &str, index: u64) -> Address {
    let hash = keccak256(format!("{}:{}", kind, index).as_bytes());
    Address::from_slice(&hash[12..])
}

fn done() -> Outcome {
    Ok((Vec::new(), Vec::new()))
}

impl ChainState {
    fn execute(&mut self, from: Address, to: Address, data: &[u8]) -> Outcome {
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| "missing selector".to_string())?;

        if to == self.factory {
            return self.execute_factory(from, selector, data);
        }

        let token_count = &mut self.token_count;
        let nft = self
            .nfts
            .get_mut(&to)
            .ok_or_else(|| format!("no contract at {}", to))?;
        execute_nft(nft, token_count, from, selector, data)
    }

    fn execute_factory(&mut self, from: Address, selector: [u8; 4], data: &[u8]) -> Outcome {
        match selector {
            s if s == deployERC721ContractCall::SELECTOR => {
                let call: deployERC721ContractCall = decode(data)?;
                let address = derive_address("nft", self.nfts.len() as u64);

                let mut nft = NftState {
                    name: call.name.clone(),
                    symbol: call.symbol.clone(),
                    owner: from,
                    token_uri: call._tokenURI.clone(),
                    metadata_state: 0,
                    roles: HashMap::new(),
                    data: HashMap::new(),
                };
                nft.flags(from).manager = true;
                if call.additionalERC20Deployer != Address::ZERO {
                    nft.flags(call.additionalERC20Deployer).deploy_erc20 = true;
                }
                self.nfts.insert(address, nft);

                let event = NFTCreated {
                    newTokenAddress: address,
                    templateAddress: Address::with_last_byte(0x72),
                    tokenName: call.name,
                    admin: from,
                    symbol: call.symbol,
                    tokenURI: call._tokenURI,
                };
                Ok((
                    deployERC721ContractCall::abi_encode_returns(&(address,)),
                    vec![event.encode_log_data()],
                ))
            }
            s if s == getCurrentNFTCountCall::SELECTOR => Ok((
                getCurrentNFTCountCall::abi_encode_returns(&(U256::from(self.nfts.len()),)),
                vec![],
            )),
            s if s == getCurrentTokenCountCall::SELECTOR => Ok((
                getCurrentTokenCountCall::abi_encode_returns(&(U256::from(self.token_count),)),
                vec![],
            )),
            _ => Err("unknown factory function".to_string()),
        }
    }
}

fn execute_nft(
    nft: &mut NftState,
    token_count: &mut u64,
    from: Address,
    selector: [u8; 4],
    data: &[u8],
) -> Outcome {
    let is_owner = nft.owner == from;
    let is_manager = nft.has(from, |f| f.manager);

    match selector {
        // owner-only
        s if s == addManagerCall::SELECTOR => {
            let call: addManagerCall = decode(data)?;
            require(is_owner, NOT_OWNER)?;
            nft.flags(call._managerAddress).manager = true;
            done()
        }
        s if s == removeManagerCall::SELECTOR => {
            let call: removeManagerCall = decode(data)?;
            require(is_owner, NOT_OWNER)?;
            nft.flags(call._managerAddress).manager = false;
            done()
        }
        s if s == cleanPermissionsCall::SELECTOR => {
            require(is_owner, NOT_OWNER)?;
            nft.roles.clear();
            done()
        }
        s if s == setTokenURICall::SELECTOR => {
            let call: setTokenURICall = decode(data)?;
            require(is_owner, NOT_OWNER)?;
            nft.token_uri = call._tokenURI;
            done()
        }
        s if s == transferFromCall::SELECTOR || s == safeTransferFromCall::SELECTOR => {
            let (src, dst, token_id) = if s == transferFromCall::SELECTOR {
                let call: transferFromCall = decode(data)?;
                (call.from, call.to, call.tokenId)
            } else {
                let call: safeTransferFromCall = decode(data)?;
                (call.from, call.to, call.tokenId)
            };
            require(token_id == U256::from(1), "ERC721: invalid token ID")?;
            require(is_owner && src == from, NOT_OWNER)?;
            nft.owner = dst;
            nft.roles.clear();
            nft.flags(dst).manager = true;
            done()
        }

        // manager-only
        s if s == addToCreateERC20ListCall::SELECTOR => {
            let call: addToCreateERC20ListCall = decode(data)?;
            require(is_manager, NOT_MANAGER)?;
            nft.flags(call._allowedAddress).deploy_erc20 = true;
            done()
        }
        s if s == removeFromCreateERC20ListCall::SELECTOR => {
            let call: removeFromCreateERC20ListCall = decode(data)?;
            require(is_manager, NOT_MANAGER)?;
            nft.flags(call._allowedAddress).deploy_erc20 = false;
            done()
        }
        s if s == addToMetadataListCall::SELECTOR => {
            let call: addToMetadataListCall = decode(data)?;
            require(is_manager, NOT_MANAGER)?;
            nft.flags(call._allowedAddress).update_metadata = true;
            done()
        }
        s if s == removeFromMetadataListCall::SELECTOR => {
            let call: removeFromMetadataListCall = decode(data)?;
            require(is_manager, NOT_MANAGER)?;
            nft.flags(call._allowedAddress).update_metadata = false;
            done()
        }
        s if s == addTo725StoreListCall::SELECTOR => {
            let call: addTo725StoreListCall = decode(data)?;
            require(is_manager, NOT_MANAGER)?;
            nft.flags(call._allowedAddress).store = true;
            done()
        }
        s if s == removeFrom725StoreListCall::SELECTOR => {
            let call: removeFrom725StoreListCall = decode(data)?;
            require(is_manager, NOT_MANAGER)?;
            nft.flags(call._allowedAddress).store = false;
            done()
        }

        // role holders
        s if s == createERC20Call::SELECTOR => {
            let call: createERC20Call = decode(data)?;
            require(nft.has(from, |f| f.deploy_erc20), NOT_DEPLOYER)?;
            require(call.strings.len() == 2, "strings must be [name, symbol]")?;

            let address = derive_address("erc20", *token_count);
            *token_count += 1;

            let event = TokenCreated {
                newTokenAddress: address,
                templateAddress: Address::with_last_byte(0x20),
                name: call.strings[0].clone(),
                symbol: call.strings[1].clone(),
                cap: call.uints.first().copied().unwrap_or_default(),
                creator: from,
            };
            Ok((
                createERC20Call::abi_encode_returns(&(address,)),
                vec![event.encode_log_data()],
            ))
        }
        s if s == setNewDataCall::SELECTOR => {
            let call: setNewDataCall = decode(data)?;
            require(nft.has(from, |f| f.store), NOT_STORE_UPDATER)?;
            nft.data.insert(call._key, call._value);
            done()
        }
        s if s == setMetaDataStateCall::SELECTOR => {
            let call: setMetaDataStateCall = decode(data)?;
            require(nft.has(from, |f| f.update_metadata), NOT_METADATA_UPDATER)?;
            nft.metadata_state = call._metaDataState;
            done()
        }

        // views
        s if s == ownerOfCall::SELECTOR => {
            let call: ownerOfCall = decode(data)?;
            require(call.tokenId == U256::from(1), "ERC721: invalid token ID")?;
            Ok((ownerOfCall::abi_encode_returns(&(nft.owner,)), vec![]))
        }
        s if s == getPermissionsCall::SELECTOR => {
            let call: getPermissionsCall = decode(data)?;
            let flags = nft.roles.get(&call.user).copied().unwrap_or_default();
            let roles = Roles {
                manager: flags.manager,
                deployERC20: flags.deploy_erc20,
                updateMetadata: flags.update_metadata,
                store: flags.store,
            };
            Ok((getPermissionsCall::abi_encode_returns(&(roles,)), vec![]))
        }
        s if s == isERC20DeployerCall::SELECTOR => {
            let call: isERC20DeployerCall = decode(data)?;
            let held = nft.has(call.account, |f| f.deploy_erc20);
            Ok((isERC20DeployerCall::abi_encode_returns(&(held,)), vec![]))
        }
        s if s == getDataCall::SELECTOR => {
            let call: getDataCall = decode(data)?;
            let value = nft.data.get(&call._key).cloned().unwrap_or_default();
            Ok((getDataCall::abi_encode_returns(&(value,)), vec![]))
        }
        s if s == tokenURICall::SELECTOR => {
            Ok((tokenURICall::abi_encode_returns(&(nft.token_uri.clone(),)), vec![]))
        }
        s if s == nameCall::SELECTOR => {
            Ok((nameCall::abi_encode_returns(&(nft.name.clone(),)), vec![]))
        }
        s if s == symbolCall::SELECTOR => {
            Ok((symbolCall::abi_encode_returns(&(nft.symbol.clone(),)), vec![]))
        }
        _ => Err("unknown template function".to_string()),
    }
}

#[derive(Deserialize)]
struct TxRequest {
    #[serde(default)]
    from: Option<Address>,
    to: Address,
    data: Bytes,
}

fn parse_tx(params: &Value) -> Result<TxRequest, RpcError> {
    serde_json::from_value(params[0].clone()).map_err(|e| RpcError::Rpc {
        code: -32602,
        message: e.to_string(),
        data: None,
    })
}

fn revert(reason: String) -> RpcError {
    let data = Revert {
        reason: reason.clone(),
    }
    .abi_encode();
    RpcError::Rpc {
        code: 3,
        message: format!("execution reverted: {}", reason),
        data: Some(json!(Bytes::from(data))),
    }
}

/// Fake node; every call and transaction runs against in-memory contracts
pub struct FakeChain {
    accounts: Vec<Address>,
    factory: Address,
    state: Mutex<ChainState>,
    receipts: Mutex<HashMap<B256, Value>>,
    methods: Mutex<Vec<String>>,
}

impl FakeChain {
    pub fn new() -> Arc<Self> {
        let factory = Address::with_last_byte(0xfa);
        Arc::new(Self {
            accounts: (1..=4).map(Address::with_last_byte).collect(),
            factory,
            state: Mutex::new(ChainState {
                factory,
                nfts: HashMap::new(),
                token_count: 0,
                nonce: 0,
            }),
            receipts: Mutex::new(HashMap::new()),
            methods: Mutex::new(Vec::new()),
        })
    }

    pub fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    pub fn factory(&self) -> Address {
        self.factory
    }

    /// JSON-RPC methods received so far
    pub fn methods(&self) -> Vec<String> {
        self.methods.lock().clone()
    }

    /// Client with fast receipt polling
    pub fn client(self: &Arc<Self>) -> EthClient {
        EthClient::new(self.clone())
            .with_receipt_polling(Duration::from_millis(1), Duration::from_secs(5))
    }

    fn dry_run(&self, tx: &TxRequest) -> Result<Vec<u8>, RpcError> {
        let mut scratch = self.state.lock().clone();
        let from = tx.from.unwrap_or_default();
        scratch
            .execute(from, tx.to, &tx.data)
            .map(|(output, _)| output)
            .map_err(revert)
    }

    fn send(&self, tx: &TxRequest) -> B256 {
        let mut state = self.state.lock();
        state.nonce += 1;
        let hash = keccak256(state.nonce.to_be_bytes());
        let block = state.nonce;

        // commit only on success so a failed transaction leaves no trace
        let mut next = state.clone();
        let from = tx.from.unwrap_or_default();
        let (status, logs) = match next.execute(from, tx.to, &tx.data) {
            Ok((_, logs)) => {
                *state = next;
                ("0x1", logs)
            }
            Err(_) => ("0x0", Vec::new()),
        };

        let logs: Vec<Value> = logs
            .iter()
            .map(|log| {
                json!({
                    "address": tx.to,
                    "topics": log.topics(),
                    "data": log.data,
                })
            })
            .collect();

        self.receipts.lock().insert(
            hash,
            json!({
                "transactionHash": hash,
                "blockNumber": format!("{:#x}", block),
                "gasUsed": ESTIMATED_GAS,
                "status": status,
                "logs": logs,
            }),
        );
        hash
    }
}

#[async_trait]
impl Transport for FakeChain {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.methods.lock().push(method.to_string());

        match method {
            "eth_accounts" => Ok(json!(self.accounts)),
            "eth_chainId" => Ok(json!("0x2324")),
            "eth_call" => {
                let tx = parse_tx(&params)?;
                let output = self.dry_run(&tx)?;
                Ok(json!(Bytes::from(output)))
            }
            "eth_estimateGas" => {
                let tx = parse_tx(&params)?;
                self.dry_run(&tx)?;
                Ok(json!(ESTIMATED_GAS))
            }
            "eth_sendTransaction" => {
                let tx = parse_tx(&params)?;
                Ok(json!(self.send(&tx)))
            }
            "eth_getTransactionReceipt" => {
                let hash: B256 = serde_json::from_value(params[0].clone()).map_err(|e| {
                    RpcError::InvalidResponse(e.to_string())
                })?;
                Ok(self.receipts.lock().get(&hash).cloned().unwrap_or(Value::Null))
            }
            other => Err(RpcError::Rpc {
                code: -32601,
                message: format!("the method {} does not exist", other),
                data: None,
            }),
        }
    }
}
