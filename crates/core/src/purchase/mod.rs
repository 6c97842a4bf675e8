//! Purchase submission.
//!
//! [`PurchaseSubmitter`] performs the contract call and holds no state between
//! calls. [`PurchaseTracker`] owns the status of one item and is what a
//! presentation layer keeps next to each rendered item.

mod tracker;

pub use tracker::PurchaseTracker;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::contract::{AssetId, CallOptions, ContractError, ContractHandle, Item, ProviderHandle};
use crate::metrics;
use crate::status::TransitionError;

/// Errors from a purchase attempt.
#[derive(Debug, Error)]
pub enum PurchaseError {
    /// The base asset lookup or the `buy_item` call failed.
    #[error("purchase failed: {0}")]
    Remote(#[from] ContractError),

    /// The item's status does not allow a purchase right now.
    #[error(transparent)]
    InvalidState(#[from] TransitionError),
}

/// Purchase settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseConfig {
    /// Variable outputs requested with every purchase (at least 1).
    #[serde(default = "default_variable_outputs")]
    pub variable_outputs: u32,
    /// Whether an item can be bought again after a successful purchase.
    #[serde(default = "default_allow_repurchase")]
    pub allow_repurchase: bool,
}

fn default_variable_outputs() -> u32 {
    1
}

fn default_allow_repurchase() -> bool {
    true
}

impl Default for PurchaseConfig {
    fn default() -> Self {
        Self {
            variable_outputs: default_variable_outputs(),
            allow_repurchase: default_allow_repurchase(),
        }
    }
}

/// A purchase accepted by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseReceipt {
    pub item_id: u64,
    /// Amount forwarded, in native units of `asset_id`.
    pub amount: u64,
    pub asset_id: AssetId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Submits `buy_item` calls.
#[derive(Debug, Clone, Default)]
pub struct PurchaseSubmitter {
    config: PurchaseConfig,
}

impl PurchaseSubmitter {
    pub fn new(config: PurchaseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PurchaseConfig {
        &self.config
    }

    /// Buy `item`, paying exactly `item.price` of the base asset.
    pub async fn submit(
        &self,
        contract: &dyn ContractHandle,
        provider: &dyn ProviderHandle,
        item: &Item,
    ) -> Result<PurchaseReceipt, PurchaseError> {
        let result = self.send(contract, provider, item).await;

        match &result {
            Ok(receipt) => {
                info!(
                    "Purchased item {} for {} of {}",
                    item.id, receipt.amount, receipt.asset_id
                );
                metrics::PURCHASES.with_label_values(&["success"]).inc();
            }
            Err(e) => {
                error!("Purchase of item {} failed: {}", item.id, e);
                metrics::PURCHASES.with_label_values(&["error"]).inc();
            }
        }

        result
    }

    async fn send(
        &self,
        contract: &dyn ContractHandle,
        provider: &dyn ProviderHandle,
        item: &Item,
    ) -> Result<PurchaseReceipt, PurchaseError> {
        let asset_id = provider.get_base_asset_id().await?;
        debug!(
            "Buying item {}: forwarding {} of {}",
            item.id, item.price, asset_id
        );

        let options = CallOptions::new()
            .with_forward(item.price, asset_id.clone())
            .with_variable_outputs(self.config.variable_outputs.max(1));
        let call = contract.buy_item(item.id, options).await?;

        Ok(PurchaseReceipt {
            item_id: item.id,
            amount: item.price,
            asset_id,
            tx_id: call.tx_id,
            submitted_at: Utc::now(),
        })
    }
}

/// One-shot purchase with default settings.
///
/// Holds no state: calling again after a failure is a fresh, independent attempt.
pub async fn submit_purchase(
    contract: &dyn ContractHandle,
    provider: &dyn ProviderHandle,
    item: &Item,
) -> Result<PurchaseReceipt, PurchaseError> {
    PurchaseSubmitter::default()
        .submit(contract, provider, item)
        .await
}
