//! Catalog owner with per-item purchase status.
//!
//! [`CatalogView`] is what a presentation layer holds: the load status, the
//! last successful catalog, and one [`PurchaseTracker`] per item. It can be
//! shared behind an `Arc`; the internal lock is never held across a remote
//! call, so loads and purchases on different items run concurrently.
//!
//! Results that arrive after [`dispose`](CatalogView::dispose), or after a
//! newer reload has started, are discarded.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogLoader, LoadError};
use crate::contract::{ContractHandle, Item, ProviderHandle};
use crate::purchase::{PurchaseError, PurchaseReceipt, PurchaseSubmitter, PurchaseTracker};
use crate::status::{LoadStatus, PurchaseStatus, TransitionError};

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("item {0} is not in the catalog")]
    UnknownItem(u64),

    #[error("purchase of item {id} is unavailable: {source}")]
    PurchaseUnavailable {
        id: u64,
        #[source]
        source: TransitionError,
    },

    #[error("catalog view has been disposed")]
    Disposed,

    #[error(transparent)]
    InvalidState(#[from] TransitionError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Purchase(#[from] PurchaseError),
}

/// One item as rendered: contract data plus client-side state.
#[derive(Debug, Clone, Serialize)]
pub struct ItemSnapshot {
    #[serde(flatten)]
    pub item: Item,
    /// Price formatted with the configured price precision, when that
    /// precision is supported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_display: Option<String>,
    pub purchase: PurchaseStatus,
    pub can_buy: bool,
    pub can_reset: bool,
}

/// Point-in-time copy of the view.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSnapshot {
    pub status: LoadStatus,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
    pub items: Vec<ItemSnapshot>,
}

#[derive(Debug, Default)]
struct ViewState {
    status: LoadStatus,
    catalog: Option<Catalog>,
    purchases: HashMap<u64, PurchaseTracker>,
    /// Incremented on every reload; a load only applies if it still matches.
    generation: u64,
    disposed: bool,
}

impl ViewState {
    fn ensure_live(&self) -> Result<(), ViewError> {
        if self.disposed {
            Err(ViewError::Disposed)
        } else {
            Ok(())
        }
    }
}

pub struct CatalogView {
    loader: CatalogLoader,
    submitter: PurchaseSubmitter,
    state: RwLock<ViewState>,
}

impl CatalogView {
    pub fn new(loader: CatalogLoader, submitter: PurchaseSubmitter) -> Self {
        Self {
            loader,
            submitter,
            state: RwLock::new(ViewState::default()),
        }
    }

    pub async fn status(&self) -> LoadStatus {
        self.state.read().await.status
    }

    pub async fn is_disposed(&self) -> bool {
        self.state.read().await.disposed
    }

    /// Item count of the current catalog (0 while none is loaded).
    pub async fn count(&self) -> u64 {
        self.state
            .read()
            .await
            .catalog
            .as_ref()
            .map(Catalog::count)
            .unwrap_or(0)
    }

    /// Start a fresh load and apply its result.
    ///
    /// Purchase status is kept for ids present in the new catalog. A failed
    /// load drops the catalog and every tracker. If this load was superseded
    /// or the view was disposed meanwhile, the result is discarded and the
    /// current status is returned.
    pub async fn reload(&self, contract: &dyn ContractHandle) -> Result<LoadStatus, ViewError> {
        let generation = {
            let mut state = self.state.write().await;
            state.ensure_live()?;
            state.generation += 1;
            state.status = state.status.begin();
            state.generation
        };

        let result = self.loader.load(contract).await;

        let mut state = self.state.write().await;
        if state.disposed {
            warn!("Discarding catalog load: view disposed");
            return Ok(state.status);
        }
        if state.generation != generation {
            debug!(
                "Discarding catalog load {}: superseded by {}",
                generation, state.generation
            );
            return Ok(state.status);
        }

        match result {
            Ok(catalog) => {
                let allow_repurchase = self.submitter.config().allow_repurchase;
                let mut purchases = std::mem::take(&mut state.purchases);
                state.purchases = catalog
                    .items()
                    .iter()
                    .map(|item| {
                        let tracker = purchases
                            .remove(&item.id)
                            .unwrap_or_else(|| PurchaseTracker::new(allow_repurchase));
                        (item.id, tracker)
                    })
                    .collect();
                state.catalog = Some(catalog);
                state.status = state.status.succeed()?;
                Ok(state.status)
            }
            Err(e) => {
                state.catalog = None;
                state.purchases.clear();
                state.status = state.status.fail()?;
                Err(e.into())
            }
        }
    }

    /// Buy item `id` from the current catalog.
    ///
    /// Refused unless the item's purchase status is `None`.
    pub async fn buy(
        &self,
        id: u64,
        contract: &dyn ContractHandle,
        provider: &dyn ProviderHandle,
    ) -> Result<PurchaseReceipt, ViewError> {
        let item = {
            let mut state = self.state.write().await;
            state.ensure_live()?;
            let item = state
                .catalog
                .as_ref()
                .and_then(|c| c.get(id))
                .cloned()
                .ok_or(ViewError::UnknownItem(id))?;
            let tracker = state
                .purchases
                .get_mut(&id)
                .ok_or(ViewError::UnknownItem(id))?;
            tracker
                .begin()
                .map_err(|source| ViewError::PurchaseUnavailable { id, source })?;
            item
        };

        let result = self.submitter.submit(contract, provider, &item).await;

        let mut state = self.state.write().await;
        if state.disposed {
            warn!("Discarding purchase result for item {}: view disposed", id);
        } else {
            match state.purchases.get_mut(&id) {
                Some(tracker) => {
                    if let Err(e) = tracker.complete(&result) {
                        debug!("Discarding purchase result for item {}: {}", id, e);
                    }
                }
                None => debug!(
                    "Discarding purchase result for item {}: no longer listed",
                    id
                ),
            }
        }

        result.map_err(ViewError::from)
    }

    /// Return item `id` to `None` so it can be bought again.
    pub async fn reset_purchase(&self, id: u64) -> Result<PurchaseStatus, ViewError> {
        let mut state = self.state.write().await;
        state.ensure_live()?;
        let tracker = state
            .purchases
            .get_mut(&id)
            .ok_or(ViewError::UnknownItem(id))?;
        tracker
            .reset()
            .map_err(|source| ViewError::PurchaseUnavailable { id, source })
    }

    pub async fn purchase_status(&self, id: u64) -> Option<PurchaseStatus> {
        self.state
            .read()
            .await
            .purchases
            .get(&id)
            .map(PurchaseTracker::status)
    }

    /// Tear the view down. Pending loads and purchases are discarded when they finish.
    pub async fn dispose(&self) {
        let mut state = self.state.write().await;
        if state.disposed {
            return;
        }
        state.disposed = true;
        state.catalog = None;
        state.purchases.clear();
        info!("Catalog view disposed");
    }

    pub async fn snapshot(&self) -> CatalogSnapshot {
        let state = self.state.read().await;
        let units = self.loader.units();

        let items = state
            .catalog
            .as_ref()
            .map(|catalog| {
                catalog
                    .items()
                    .iter()
                    .map(|item| {
                        let tracker = state.purchases.get(&item.id);
                        ItemSnapshot {
                            item: item.clone(),
                            price_display: units.format_price(item.price).ok(),
                            purchase: tracker.map(|t| t.status()).unwrap_or_default(),
                            can_buy: tracker.map(|t| t.can_buy()).unwrap_or(false),
                            can_reset: tracker.map(|t| t.can_reset()).unwrap_or(false),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        CatalogSnapshot {
            status: state.status,
            count: state.catalog.as_ref().map(Catalog::count).unwrap_or(0),
            loaded_at: state.catalog.as_ref().map(Catalog::loaded_at),
            items,
        }
    }
}
