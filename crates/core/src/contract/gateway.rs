//! JSON-RPC client for a wallet gateway.
//!
//! The gateway holds the connected wallet and signs transactions for it. This
//! client only builds contract calls and reads their results. The methods
//! used are:
//!
//! - `contract_call` for read-only calls (dry run, nothing is signed)
//! - `contract_submit` for transactions
//! - `provider_base_asset_id` for the chain's base asset

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::types::{AssetId, CallOptions, CallReceipt, ContractId, Identity, Item, Metadata};
use super::{ContractError, ContractHandle, ProviderHandle};

/// Gateway connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// JSON-RPC endpoint (e.g. "http://localhost:4000/rpc").
    pub url: String,
    /// Deployed marketplace contract.
    pub contract_id: ContractId,
    /// Bearer token for the gateway, if it requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Contract and provider handle backed by a wallet gateway.
pub struct GatewayContractClient {
    client: Client,
    endpoint: Url,
    contract_id: ContractId,
    request_id: AtomicU64,
}

impl GatewayContractClient {
    pub fn new(config: GatewayConfig) -> Result<Self, ContractError> {
        let endpoint = Url::parse(&config.url).map_err(|e| {
            ContractError::NotConfigured(format!("invalid gateway URL {:?}: {}", config.url, e))
        })?;

        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ContractError::NotConfigured(
                    "gateway token is not a valid header value".to_string(),
                )
            })?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            contract_id: config.contract_id,
            request_id: AtomicU64::new(0),
        })
    }

    /// The contract this client calls.
    pub fn contract_id(&self) -> &ContractId {
        &self.contract_id
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value, ContractError> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ContractError::RpcError {
                code: status.as_u16() as i64,
                message: text,
            });
        }

        let value: Value = response.json().await.map_err(|e| {
            ContractError::InvalidResponse(format!("{} returned non-JSON body: {}", method, e))
        })?;

        jsonrpc_result(value)
    }

    async fn read(&self, function: &str, args: Value) -> Result<Value, ContractError> {
        debug!("Gateway read: {}({})", function, args);
        self.send_request("contract_call", read_params(&self.contract_id, function, args))
            .await
    }

    async fn submit(
        &self,
        function: &str,
        args: Value,
        options: &CallOptions,
    ) -> Result<CallReceipt, ContractError> {
        debug!(
            "Gateway submit: {}({}) forward={:?} variable_outputs={}",
            function, args, options.forward, options.variable_outputs
        );
        let result = self
            .send_request(
                "contract_submit",
                submit_params(&self.contract_id, function, args, options),
            )
            .await?;
        decode_receipt(result)
    }
}

#[async_trait]
impl ContractHandle for GatewayContractClient {
    async fn get_count(&self) -> Result<u64, ContractError> {
        let value = self.read("get_count", json!([])).await?;
        parse_u64(&value, "count")
    }

    async fn get_item(&self, id: u64) -> Result<Item, ContractError> {
        let value = self.read("get_item", json!([id])).await?;
        decode_item(value)
    }

    async fn buy_item(
        &self,
        id: u64,
        options: CallOptions,
    ) -> Result<CallReceipt, ContractError> {
        self.submit("buy_item", json!([id]), &options).await
    }

    async fn list_item(
        &self,
        price: u64,
        metadata: Metadata,
    ) -> Result<CallReceipt, ContractError> {
        self.submit(
            "list_item",
            json!([price, metadata.as_str()]),
            &CallOptions::new(),
        )
        .await
    }
}

#[async_trait]
impl ProviderHandle for GatewayContractClient {
    async fn get_base_asset_id(&self) -> Result<AssetId, ContractError> {
        debug!("Gateway base asset lookup");
        let value = self.send_request("provider_base_asset_id", json!({})).await?;
        let raw = value.as_str().ok_or_else(|| {
            ContractError::InvalidResponse(format!("base asset id is not a string: {}", value))
        })?;
        AssetId::parse(raw).map_err(|e| ContractError::InvalidResponse(e.to_string()))
    }
}

fn read_params(contract_id: &ContractId, function: &str, args: Value) -> Value {
    json!({
        "contract_id": contract_id,
        "function": function,
        "args": args,
    })
}

fn submit_params(
    contract_id: &ContractId,
    function: &str,
    args: Value,
    options: &CallOptions,
) -> Value {
    json!({
        "contract_id": contract_id,
        "function": function,
        "args": args,
        "call_params": { "forward": options.forward },
        "tx_policy": { "variable_outputs": options.variable_outputs },
    })
}

/// Unwrap a JSON-RPC 2.0 response envelope.
fn jsonrpc_result(val: Value) -> Result<Value, ContractError> {
    if let Some(err) = val.get("error") {
        if let Some(reason) = err
            .get("data")
            .and_then(|d| d.get("revert_reason"))
            .and_then(|r| r.as_str())
        {
            return Err(ContractError::Reverted(reason.to_string()));
        }
        let code = err.get("code").and_then(|c| c.as_i64()).unwrap_or(-1);
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error");
        return Err(ContractError::RpcError {
            code,
            message: message.to_string(),
        });
    }

    val.get("result")
        .cloned()
        .ok_or_else(|| ContractError::InvalidResponse("Missing result field".to_string()))
}

/// Read a u64 that may be encoded as a number, a decimal string or a hex string.
fn parse_u64(value: &Value, field: &str) -> Result<u64, ContractError> {
    let invalid = || ContractError::InvalidResponse(format!("{} is not a u64: {}", field, value));

    match value {
        Value::Number(n) => n.as_u64().ok_or_else(invalid),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16).map_err(|_| invalid()),
                None => s.parse().map_err(|_| invalid()),
            }
        }
        _ => Err(invalid()),
    }
}

#[derive(Deserialize)]
struct RawItem {
    id: Value,
    price: Value,
    owner: Identity,
    metadata: Metadata,
    total_bought: Value,
}

fn decode_item(value: Value) -> Result<Item, ContractError> {
    let raw: RawItem = serde_json::from_value(value)
        .map_err(|e| ContractError::InvalidResponse(format!("malformed item: {}", e)))?;

    Ok(Item {
        id: parse_u64(&raw.id, "item.id")?,
        price: parse_u64(&raw.price, "item.price")?,
        owner: raw.owner,
        metadata: raw.metadata,
        total_bought: parse_u64(&raw.total_bought, "item.total_bought")?,
    })
}

fn decode_receipt(value: Value) -> Result<CallReceipt, ContractError> {
    if value.is_null() {
        return Ok(CallReceipt { tx_id: None });
    }
    serde_json::from_value(value)
        .map_err(|e| ContractError::InvalidResponse(format!("malformed receipt: {}", e)))
}
