//! JSON-RPC transport to an Ethereum node

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

/// Default HTTP timeout for a single request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport-level failures
#[derive(Error, Debug, Clone)]
pub enum RpcError {
    /// The node could not be reached
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The node answered with something that is not JSON-RPC
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The node answered with a JSON-RPC error object
    #[error("{message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },
}

/// Sends JSON-RPC requests to a node
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform `method` with positional `params` and return the `result` member
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// JSON-RPC 2.0 over HTTP POST
pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: &str) -> Result<Self, RpcError> {
        Self::with_timeout(url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        trace!(id, method, %params, "JSON-RPC request");

        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::ConnectionFailed(format!("{}: {}", self.url, e)))?;

        let response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;

        into_result(response)
    }
}

fn into_result(response: JsonRpcResponse) -> Result<Value, RpcError> {
    match response.error {
        Some(err) => Err(RpcError::Rpc {
            code: err.code,
            message: err.message,
            data: err.data,
        }),
        None => Ok(response.result.unwrap_or(Value::Null)),
    }
}
