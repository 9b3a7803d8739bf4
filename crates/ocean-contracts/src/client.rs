//! Ethereum client shared by the contract wrappers
//!
//! Every state-changing contract method goes through the same sequence:
//!
//! ```text
//!   eth_estimateGas ──► eth_sendTransaction ──► eth_getTransactionReceipt (poll)
//!        │                                              │
//!        └── revert: relayed as ContractError::Reverted └── status 0x0: replayed with
//!                                                            eth_call for the reason
//! ```
//!
//! Transactions are sent from accounts the node manages; no signing happens here.

use crate::error::{ContractError, Result};
use crate::rpc::{HttpTransport, Transport};
use alloy_primitives::{Address, Bytes, B256, U64};
use alloy_sol_types::{SolCall, SolEvent};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default interval between receipt polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default time to wait for a transaction to be mined
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Log entry of a mined transaction
#[derive(Clone, Debug, Deserialize)]
pub struct ReceiptLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// Receipt of a mined transaction
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: B256,

    #[serde(default)]
    pub block_number: Option<U64>,

    #[serde(default)]
    pub gas_used: Option<U64>,

    /// `0x1` on success, `0x0` on revert (absent before Byzantium)
    #[serde(default)]
    pub status: Option<U64>,

    #[serde(default)]
    pub logs: Vec<ReceiptLog>,
}

impl TxReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.map_or(true, |s| s != U64::ZERO)
    }

    /// First log decoding as event `E`
    pub fn decode_event<E: SolEvent>(&self) -> Option<E> {
        self.logs
            .iter()
            .filter(|log| log.topics.first() == Some(&E::SIGNATURE_HASH))
            .find_map(|log| E::decode_raw_log(log.topics.iter().copied(), &log.data, true).ok())
    }
}

/// Thin Ethereum JSON-RPC client
#[derive(Clone)]
pub struct EthClient {
    transport: Arc<dyn Transport>,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl EthClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            poll_interval: DEFAULT_POLL_INTERVAL,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
        }
    }

    /// Client talking HTTP JSON-RPC to `url`
    pub fn http(url: &str) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(url)?)))
    }

    pub fn with_receipt_polling(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.receipt_timeout = timeout;
        self
    }

    /// Accounts the node can send from
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        let result = self.transport.request("eth_accounts", json!([])).await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn chain_id(&self) -> Result<u64> {
        let result = self.transport.request("eth_chainId", json!([])).await?;
        let id: U64 = serde_json::from_value(result)?;
        Ok(id.to::<u64>())
    }

    /// `eth_call` with raw calldata
    pub async fn call_raw(&self, from: Option<Address>, to: Address, data: Vec<u8>) -> Result<Bytes> {
        let request = tx_request(from, to, &data);
        let result = self
            .transport
            .request("eth_call", json!([request, "latest"]))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Read-only contract call, decoding the return values
    pub async fn call<C: SolCall>(&self, to: Address, call: &C) -> Result<C::Return> {
        debug!(%to, function = C::SIGNATURE, "eth_call");
        let output = self.call_raw(None, to, call.abi_encode()).await?;
        Ok(C::abi_decode_returns(&output, true)?)
    }

    /// Gas the node estimates for raw calldata; reverts surface here
    pub async fn estimate_gas_raw(&self, from: Address, to: Address, data: Vec<u8>) -> Result<u64> {
        let request = tx_request(Some(from), to, &data);
        let result = self
            .transport
            .request("eth_estimateGas", json!([request]))
            .await?;
        let gas: U64 = serde_json::from_value(result)?;
        Ok(gas.to::<u64>())
    }

    pub async fn estimate_gas<C: SolCall>(&self, from: Address, to: Address, call: &C) -> Result<u64> {
        self.estimate_gas_raw(from, to, call.abi_encode()).await
    }

    /// Send a contract call as a transaction and wait for its receipt
    pub async fn send<C: SolCall>(&self, from: Address, to: Address, call: &C) -> Result<TxReceipt> {
        self.send_raw(from, to, call.abi_encode(), C::SIGNATURE).await
    }

    /// Send raw calldata; `label` names the call in logs
    pub async fn send_raw(
        &self,
        from: Address,
        to: Address,
        data: Vec<u8>,
        label: &str,
    ) -> Result<TxReceipt> {
        let gas = self.estimate_gas_raw(from, to, data.clone()).await?;
        debug!(%from, %to, function = label, gas, "eth_sendTransaction");

        let mut request = tx_request(Some(from), to, &data);
        request["gas"] = Value::String(format!("{:#x}", gas));

        let result = self
            .transport
            .request("eth_sendTransaction", json!([request]))
            .await?;
        let hash: B256 = serde_json::from_value(result)?;

        let receipt = self.wait_for_receipt(hash).await?;
        if !receipt.succeeded() {
            warn!(%hash, function = label, "Transaction reverted");
            return Err(self.failure_reason(from, to, &data, &receipt).await);
        }

        info!(
            %hash,
            function = label,
            block = receipt.block_number.map(|b| b.to::<u64>()),
            "Transaction mined"
        );
        Ok(receipt)
    }

    /// Replay a transaction mined with status `0x0` as an `eth_call` at its
    /// block to recover the contract's revert message
    async fn failure_reason(
        &self,
        from: Address,
        to: Address,
        data: &[u8],
        receipt: &TxReceipt,
    ) -> ContractError {
        let failed = ContractError::TransactionFailed(receipt.transaction_hash.to_string());
        let block = receipt
            .block_number
            .map_or_else(|| json!("latest"), |number| json!(number));
        let request = tx_request(Some(from), to, data);

        match self.transport.request("eth_call", json!([request, block])).await {
            Err(e) => match ContractError::from(e) {
                reverted @ ContractError::Reverted(_) => reverted,
                other => {
                    debug!(error = %other, "Replay of failed transaction gave no reason");
                    failed
                }
            },
            Ok(_) => failed,
        }
    }

    /// Poll for the receipt of `hash` until mined or the timeout elapses
    pub async fn wait_for_receipt(&self, hash: B256) -> Result<TxReceipt> {
        let started = tokio::time::Instant::now();
        loop {
            let result = self
                .transport
                .request("eth_getTransactionReceipt", json!([hash]))
                .await?;

            if !result.is_null() {
                return Ok(serde_json::from_value(result)?);
            }

            if started.elapsed() >= self.receipt_timeout {
                return Err(ContractError::ReceiptTimeout {
                    hash: hash.to_string(),
                    waited_secs: self.receipt_timeout.as_secs(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

fn tx_request(from: Option<Address>, to: Address, data: &[u8]) -> Value {
    let mut request = json!({
        "to": to,
        "data": Bytes::copy_from_slice(data),
    });
    if let Some(from) = from {
        request["from"] = json!(from);
    }
    request
}
