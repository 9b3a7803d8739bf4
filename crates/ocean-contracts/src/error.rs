//! Error types for contract interactions

use crate::rpc::RpcError;
use alloy_sol_types::{Revert, SolError};
use serde_json::Value;
use thiserror::Error;

/// Result type alias for contract operations
pub type Result<T> = std::result::Result<T, ContractError>;

/// Errors surfaced by the contract wrappers
#[derive(Error, Debug, Clone)]
pub enum ContractError {
    /// The contract reverted; displays as the contract's own message
    #[error("{0}")]
    Reverted(String),

    /// The transaction was mined with a failure status
    #[error("Transaction {0} reverted")]
    TransactionFailed(String),

    /// No receipt appeared in time
    #[error("Transaction {hash} not mined after {waited_secs}s")]
    ReceiptTimeout { hash: String, waited_secs: u64 },

    /// An expected event was not in the receipt
    #[error("Event {0} not found in transaction receipt")]
    MissingEvent(&'static str),

    /// The configuration does not name a required contract
    #[error("No {0} address configured")]
    MissingAddress(&'static str),

    /// A configured or user-supplied address is malformed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Argument outside the accepted set
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Return data or a node response did not decode
    #[error("Decoding failed: {0}")]
    Decode(String),

    /// Any other transport failure
    #[error(transparent)]
    Rpc(RpcError),
}

impl ContractError {
    /// Error code for CLI exit statuses and structured logs
    pub fn code(&self) -> u32 {
        match self {
            Self::Reverted(_) | Self::TransactionFailed(_) => 3001,
            Self::ReceiptTimeout { .. } => 3002,
            Self::MissingEvent(_) | Self::Decode(_) => 3003,
            Self::MissingAddress(_) | Self::InvalidAddress(_) | Self::InvalidArgument(_) => 3004,
            Self::Rpc(_) => 3005,
        }
    }

    /// Whether retrying the same request could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ReceiptTimeout { .. } | Self::Rpc(RpcError::ConnectionFailed(_))
        )
    }
}

impl From<alloy_sol_types::Error> for ContractError {
    fn from(e: alloy_sol_types::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

impl From<serde_json::Error> for ContractError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

/// Node errors carrying a revert become [`ContractError::Reverted`]
impl From<RpcError> for ContractError {
    fn from(e: RpcError) -> Self {
        match revert_reason(&e) {
            Some(reason) => Self::Reverted(reason),
            None => Self::Rpc(e),
        }
    }
}

/// Message prefixes nodes put in front of a revert reason
const REVERT_PREFIXES: &[&str] = &[
    "execution reverted: ",
    "VM Exception while processing transaction: revert ",
    "VM Exception while processing transaction: reverted with reason string ",
];

/// Extract the contract's revert message from a node error
///
/// Revert data encoded as `Error(string)` takes precedence; otherwise the
/// reason is cut out of the node's message.
pub fn revert_reason(err: &RpcError) -> Option<String> {
    let RpcError::Rpc { message, data, .. } = err else {
        return None;
    };

    if let Some(reason) = data.as_ref().and_then(reason_from_data) {
        return Some(reason);
    }

    REVERT_PREFIXES.iter().find_map(|prefix| {
        message
            .strip_prefix(prefix)
            .map(|reason| reason.trim_matches('\'').to_string())
    })
}

fn reason_from_data(data: &Value) -> Option<String> {
    match data {
        Value::String(hex) => decode_revert_hex(hex),
        Value::Object(fields) => {
            if let Some(reason) = fields.get("reason").and_then(Value::as_str) {
                return Some(reason.to_string());
            }
            fields.get("data").and_then(reason_from_data)
        }
        _ => None,
    }
}

fn decode_revert_hex(hex: &str) -> Option<String> {
    let bytes: alloy_primitives::Bytes = hex.parse().ok()?;
    Revert::abi_decode(&bytes, true).ok().map(|r| r.reason)
}
