//! # Ocean Contract Wrappers
//!
//! Client-side adapters for the data NFT contracts of the Ocean protocol:
//!
//! - [`NftFactory`] creates data NFTs through the ERC721 factory
//! - [`NftDatatoken`] manages permissions, ownership, datatokens and the
//!   key-value store of an existing data NFT
//!
//! Both are stateless. Ownership checks, permission storage and transfer
//! semantics belong to the deployed contracts; failures come back as
//! [`ContractError::Reverted`] carrying the contract's own message.
//!
//! ```text
//!   NftDatatoken / NftFactory
//!             │  ABI encode (alloy sol!)
//!             ▼
//!        EthClient ── estimate ─ send ─ poll receipt
//!             │
//!             ▼
//!     dyn Transport (HttpTransport: JSON-RPC over reqwest)
//! ```

pub mod abi;
pub mod client;
pub mod error;
pub mod factory;
pub mod nft;
pub mod rpc;

pub use client::{EthClient, ReceiptLog, TxReceipt};
pub use error::{ContractError, Result};
pub use factory::NftFactory;
pub use nft::{Erc20Params, NftDatatoken, NftPermissions, PermissionRole, NFT_TOKEN_ID};
pub use rpc::{HttpTransport, RpcError, Transport};

pub use alloy_primitives::{Address, Bytes, B256, U256};
