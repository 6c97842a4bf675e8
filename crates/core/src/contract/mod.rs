//! Access to the deployed marketplace contract.
//!
//! The workflows in this crate only talk to the contract through the
//! [`ContractHandle`] and [`ProviderHandle`] traits. Connecting a wallet and
//! signing transactions happen behind those traits, outside this crate.

mod gateway;
mod types;

pub use gateway::{GatewayConfig, GatewayContractClient};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by contract and provider calls.
#[derive(Debug, Error)]
pub enum ContractError {
    /// HTTP transport failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The gateway answered with a JSON-RPC error.
    #[error("RPC error {code}: {message}")]
    RpcError { code: i64, message: String },

    /// The contract reverted the call.
    #[error("Contract reverted: {0}")]
    Reverted(String),

    /// The response could not be interpreted.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client not configured (bad URL, missing contract id, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// An authenticated handle to the marketplace contract.
#[async_trait]
pub trait ContractHandle: Send + Sync {
    /// Number of items ever listed, in the contract's raw representation.
    async fn get_count(&self) -> Result<u64, ContractError>;

    /// Read one item by id (ids start at 1).
    async fn get_item(&self, id: u64) -> Result<Item, ContractError>;

    /// Buy an item. `options` carries the payment and output allowance.
    async fn buy_item(&self, id: u64, options: CallOptions)
        -> Result<CallReceipt, ContractError>;

    /// List a new item for sale.
    async fn list_item(&self, price: u64, metadata: Metadata)
        -> Result<CallReceipt, ContractError>;
}

/// Chain-level queries that are not tied to the contract.
#[async_trait]
pub trait ProviderHandle: Send + Sync {
    /// Asset used to pay for purchases.
    async fn get_base_asset_id(&self) -> Result<AssetId, ContractError>;
}
