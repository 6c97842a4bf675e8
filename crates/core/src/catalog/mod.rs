//! Catalog retrieval.
//!
//! A load reads the item count, then every item from id 1 to the count, one
//! call at a time. The result is all or nothing: any failure discards the
//! items fetched so far.

mod sequence;
mod types;

pub use sequence::{FetchError, ItemSequence};
pub use types::Catalog;

use std::time::Instant;

use futures::TryStreamExt;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::contract::{ContractError, ContractHandle};
use crate::metrics;
use crate::units::Units;

/// Errors that end a catalog load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The count call failed.
    #[error("failed to read item count: {0}")]
    Count(#[source] ContractError),

    /// An item call failed.
    #[error(transparent)]
    Item(#[from] FetchError),

    /// The contract answered with a value that cannot be interpreted.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Reads the full catalog from the contract.
#[derive(Debug, Clone, Default)]
pub struct CatalogLoader {
    units: Units,
}

impl CatalogLoader {
    pub fn new(units: Units) -> Self {
        Self { units }
    }

    pub fn units(&self) -> &Units {
        &self.units
    }

    /// Load every listed item.
    ///
    /// Failures are logged here; callers only need to map them to an error status.
    pub async fn load(&self, contract: &dyn ContractHandle) -> Result<Catalog, LoadError> {
        let start = Instant::now();
        let result = self.fetch(contract).await;
        let elapsed = start.elapsed().as_secs_f64();

        let label = match &result {
            Ok(catalog) => {
                info!(
                    "Catalog loaded: {} items in {:.3}s",
                    catalog.count(),
                    elapsed
                );
                "success"
            }
            Err(e) => {
                error!("Catalog load failed: {}", e);
                "error"
            }
        };
        metrics::CATALOG_LOADS.with_label_values(&[label]).inc();
        metrics::CATALOG_LOAD_DURATION
            .with_label_values(&[label])
            .observe(elapsed);

        result
    }

    async fn fetch(&self, contract: &dyn ContractHandle) -> Result<Catalog, LoadError> {
        let raw = contract.get_count().await.map_err(LoadError::Count)?;
        let count = self
            .units
            .normalize_count(raw)
            .map_err(|e| LoadError::Malformed(e.to_string()))?;
        debug!("Contract reports {} items (raw count {})", count, raw);

        if count == 0 {
            return Ok(Catalog::empty());
        }

        let items: Vec<_> = ItemSequence::new(contract, count)
            .into_stream()
            .inspect_ok(|item| {
                metrics::ITEMS_FETCHED.inc();
                debug!("Fetched item {}", item.id);
            })
            .try_collect()
            .await?;

        Ok(Catalog::new(items))
    }
}

/// One-shot load with the given scale configuration.
pub async fn load_catalog(
    contract: &dyn ContractHandle,
    units: Units,
) -> Result<Catalog, LoadError> {
    CatalogLoader::new(units).load(contract).await
}
