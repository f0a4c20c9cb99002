use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// ERC-20 balanceOf(address) selector
const BALANCE_OF_SELECTOR: &str = "0x70a08231";

#[derive(Debug, Error)]
pub enum ChainRpcError {
    #[error("rpc request failed: {0}")]
    Request(String),
    #[error("invalid rpc response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ChainRpcError {
    fn from(e: reqwest::Error) -> Self {
        ChainRpcError::Request(e.to_string())
    }
}

/// Address -> raw base-unit balances for the base asset and token contracts.
#[async_trait]
pub trait ChainRpcClient: Send + Sync {
    async fn get_base_balance(&self, address: &str) -> Result<u128, ChainRpcError>;
    async fn get_token_balance(
        &self,
        address: &str,
        contract: &str,
    ) -> Result<u128, ChainRpcError>;
}

/// Default chain client over a plain Ethereum JSON-RPC endpoint.
pub struct JsonRpcChainClient {
    client: Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    message: String,
}

impl JsonRpcChainClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
        }
    }

    async fn call(&self, method: &str, params: serde_json::Value) -> Result<u128, ChainRpcError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({
                "jsonrpc": "2.0",
                "method": method,
                "params": params,
                "id": 1,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChainRpcError::Request(format!(
                "rpc endpoint returned {}",
                response.status()
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| ChainRpcError::InvalidResponse(e.to_string()))?;
        if let Some(error) = body.error {
            return Err(ChainRpcError::Request(error.message));
        }
        let hex = body
            .result
            .ok_or_else(|| ChainRpcError::InvalidResponse("missing result".to_string()))?;
        parse_hex_quantity(&hex)
    }
}

#[async_trait]
impl ChainRpcClient for JsonRpcChainClient {
    async fn get_base_balance(&self, address: &str) -> Result<u128, ChainRpcError> {
        self.call("eth_getBalance", json!([address, "latest"])).await
    }

    async fn get_token_balance(
        &self,
        address: &str,
        contract: &str,
    ) -> Result<u128, ChainRpcError> {
        let data = format!(
            "{}{:0>64}",
            BALANCE_OF_SELECTOR,
            address.trim_start_matches("0x")
        );
        self.call("eth_call", json!([{ "to": contract, "data": data }, "latest"]))
            .await
    }
}

/// Decodes a 0x-prefixed hex quantity; eth_call pads results to 32 bytes, so
/// leading zeros are stripped before the width check.
pub(crate) fn parse_hex_quantity(hex: &str) -> Result<u128, ChainRpcError> {
    let digits = hex
        .strip_prefix("0x")
        .ok_or_else(|| ChainRpcError::InvalidResponse(format!("not a hex quantity: {}", hex)))?
        .trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }
    if digits.len() > 32 {
        return Err(ChainRpcError::InvalidResponse(
            "quantity exceeds 128 bits".to_string(),
        ));
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| ChainRpcError::InvalidResponse(e.to_string()))
}
