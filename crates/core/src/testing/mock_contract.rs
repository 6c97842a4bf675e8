//! Mock marketplace contract for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};

use crate::contract::{
    Address, AssetId, CallOptions, CallReceipt, ContractError, ContractHandle, Identity, Item,
    Metadata, ProviderHandle,
};

/// A recorded contract or provider call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    GetCount,
    GetItem { id: u64 },
    BuyItem { id: u64, options: CallOptions },
    ListItem { price: u64, metadata: Metadata },
    GetBaseAssetId,
}

/// Mock implementation of [`ContractHandle`] and [`ProviderHandle`].
///
/// Provides controllable behavior for testing:
/// - Serve configured items (like the deployed contract's storage)
/// - Track every call for assertions
/// - Simulate failures, one-shot or per item
/// - Hold calls until released, to test in-flight behavior
///
/// Successful `buy_item` calls increment the item's `total_bought`, and
/// `list_item` appends a new item, so reloads observe the changes.
///
/// # Example
///
/// ```rust,ignore
/// use marketplace_core::testing::{MockContract, fixtures};
///
/// let contract = MockContract::with_items(fixtures::items(3)).await;
/// let catalog = load_catalog(&contract, Units::default()).await?;
/// assert_eq!(catalog.count(), 3);
/// ```
#[derive(Debug)]
pub struct MockContract {
    /// Listed items by id.
    items: Arc<RwLock<BTreeMap<u64, Item>>>,
    /// Overrides the value returned by `get_count`.
    raw_count: Arc<RwLock<Option<u64>>>,
    /// Base asset returned by the provider.
    base_asset: Arc<RwLock<AssetId>>,
    /// Owner assigned to items listed through the mock.
    signer: Arc<RwLock<Identity>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// If set, the next call of any kind fails with this error.
    next_error: Arc<RwLock<Option<ContractError>>>,
    /// One-shot failures for specific item ids.
    item_errors: Arc<RwLock<HashMap<u64, ContractError>>>,
    /// If set, every `buy_item` reverts with this reason.
    buy_failure: Arc<RwLock<Option<String>>>,
    /// If set, calls wait for a notification before completing.
    gate: Arc<RwLock<Option<Arc<Notify>>>>,
}

impl Default for MockContract {
    fn default() -> Self {
        Self::new()
    }
}

impl MockContract {
    /// Create a mock contract with no listed items.
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(BTreeMap::new())),
            raw_count: Arc::new(RwLock::new(None)),
            base_asset: Arc::new(RwLock::new(AssetId::zeroed())),
            signer: Arc::new(RwLock::new(Identity::Address(Address::zeroed()))),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            item_errors: Arc::new(RwLock::new(HashMap::new())),
            buy_failure: Arc::new(RwLock::new(None)),
            gate: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a mock contract with the given items already listed.
    pub async fn with_items(items: Vec<Item>) -> Self {
        let mock = Self::new();
        mock.set_items(items).await;
        mock
    }

    // =========================================================================
    // Storage Configuration
    // =========================================================================

    /// Add or replace an item.
    pub async fn add_item(&self, item: Item) {
        self.items.write().await.insert(item.id, item);
    }

    /// Replace all items.
    pub async fn set_items(&self, items: Vec<Item>) {
        let mut map = self.items.write().await;
        map.clear();
        for item in items {
            map.insert(item.id, item);
        }
    }

    /// Current stored item, if any.
    pub async fn item(&self, id: u64) -> Option<Item> {
        self.items.read().await.get(&id).cloned()
    }

    /// Make `get_count` return `raw` instead of the number of stored items.
    pub async fn set_raw_count(&self, raw: Option<u64>) {
        *self.raw_count.write().await = raw;
    }

    /// Set the base asset returned by the provider.
    pub async fn set_base_asset(&self, asset_id: AssetId) {
        *self.base_asset.write().await = asset_id;
    }

    /// Set the owner recorded for items listed through the mock.
    pub async fn set_signer(&self, identity: Identity) {
        *self.signer.write().await = identity;
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    /// Get the number of calls performed.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Ids requested through `get_item`, in call order.
    pub async fn fetched_ids(&self) -> Vec<u64> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedCall::GetItem { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// The most recent `buy_item` call.
    pub async fn last_buy(&self) -> Option<(u64, CallOptions)> {
        self.calls.read().await.iter().rev().find_map(|c| match c {
            RecordedCall::BuyItem { id, options } => Some((*id, options.clone())),
            _ => None,
        })
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: ContractError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    /// Configure the next fetch of item `id` to fail.
    pub async fn fail_item(&self, id: u64, error: ContractError) {
        self.item_errors.write().await.insert(id, error);
    }

    /// Make every purchase revert with `reason` until cleared.
    pub async fn fail_buy(&self, reason: &str) {
        *self.buy_failure.write().await = Some(reason.to_string());
    }

    /// Let purchases succeed again.
    pub async fn clear_buy_failure(&self) {
        *self.buy_failure.write().await = None;
    }

    // =========================================================================
    // Flow Control
    // =========================================================================

    /// Hold every call until the returned [`Notify`] is signalled.
    ///
    /// Each `notify_one` releases one waiting call.
    pub async fn hold_calls(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.write().await = Some(Arc::clone(&notify));
        notify
    }

    /// Stop holding new calls.
    pub async fn release_calls(&self) {
        *self.gate.write().await = None;
    }

    /// Record a call, wait on the gate if set, then apply any pending error.
    async fn enter(&self, call: RecordedCall) -> Result<(), ContractError> {
        self.calls.write().await.push(call);

        let gate = self.gate.read().await.clone();
        if let Some(notify) = gate {
            notify.notified().await;
        }

        match self.next_error.write().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContractHandle for MockContract {
    async fn get_count(&self) -> Result<u64, ContractError> {
        self.enter(RecordedCall::GetCount).await?;

        if let Some(raw) = *self.raw_count.read().await {
            return Ok(raw);
        }
        Ok(self.items.read().await.len() as u64)
    }

    async fn get_item(&self, id: u64) -> Result<Item, ContractError> {
        self.enter(RecordedCall::GetItem { id }).await?;

        if let Some(err) = self.item_errors.write().await.remove(&id) {
            return Err(err);
        }

        self.items
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ContractError::Reverted(format!("item {} is not listed", id)))
    }

    async fn buy_item(
        &self,
        id: u64,
        options: CallOptions,
    ) -> Result<CallReceipt, ContractError> {
        self.enter(RecordedCall::BuyItem {
            id,
            options: options.clone(),
        })
        .await?;

        if let Some(reason) = self.buy_failure.read().await.clone() {
            return Err(ContractError::Reverted(reason));
        }

        if let Some(item) = self.items.write().await.get_mut(&id) {
            item.total_bought += 1;
        }

        Ok(CallReceipt {
            tx_id: Some(format!("0x{:064x}", id)),
        })
    }

    async fn list_item(
        &self,
        price: u64,
        metadata: Metadata,
    ) -> Result<CallReceipt, ContractError> {
        self.enter(RecordedCall::ListItem {
            price,
            metadata: metadata.clone(),
        })
        .await?;

        let owner = self.signer.read().await.clone();
        let mut items = self.items.write().await;
        let id = items.len() as u64 + 1;
        items.insert(
            id,
            Item {
                id,
                price,
                owner,
                metadata,
                total_bought: 0,
            },
        );

        Ok(CallReceipt {
            tx_id: Some(format!("0x{:064x}", id)),
        })
    }
}

#[async_trait]
impl ProviderHandle for MockContract {
    async fn get_base_asset_id(&self) -> Result<AssetId, ContractError> {
        self.enter(RecordedCall::GetBaseAssetId).await?;
        Ok(self.base_asset.read().await.clone())
    }
}
