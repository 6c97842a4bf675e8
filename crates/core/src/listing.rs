//! Listing new items for sale.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::contract::{CallReceipt, ContractError, ContractHandle, Metadata, METADATA_LEN};
use crate::metrics;
use crate::status::{ListingStatus, TransitionError};
use crate::units::Units;

static METADATA_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^\w{{{}}}$", METADATA_LEN)).unwrap());

#[derive(Debug, Error)]
pub enum ListingError {
    /// Rejected before any contract call.
    #[error("invalid listing: {0}")]
    Invalid(String),

    #[error("listing failed: {0}")]
    Remote(#[from] ContractError),

    #[error(transparent)]
    InvalidState(#[from] TransitionError),
}

/// A validated listing, ready to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDraft {
    /// Price in native units.
    pub price: u64,
    pub metadata: Metadata,
}

impl ListingDraft {
    /// Validate user input.
    ///
    /// `price_input` is a decimal amount in base asset units (e.g. "0.5");
    /// `metadata` must be exactly 20 word characters (`[A-Za-z0-9_]`).
    pub fn new(price_input: &str, metadata: &str, units: &Units) -> Result<Self, ListingError> {
        if !METADATA_PATTERN.is_match(metadata) {
            return Err(ListingError::Invalid(format!(
                "metadata must be exactly {} letters, digits or underscores",
                METADATA_LEN
            )));
        }
        let metadata = Metadata::new(metadata).map_err(|e| ListingError::Invalid(e.to_string()))?;

        let price = units
            .parse_price(price_input)
            .map_err(|e| ListingError::Invalid(e.to_string()))?;

        Ok(Self { price, metadata })
    }
}

/// Submits `list_item` calls.
#[derive(Debug, Clone, Default)]
pub struct ListingSubmitter;

impl ListingSubmitter {
    pub fn new() -> Self {
        Self
    }

    pub async fn submit(
        &self,
        contract: &dyn ContractHandle,
        draft: &ListingDraft,
    ) -> Result<CallReceipt, ListingError> {
        debug!("Listing {} at price {}", draft.metadata, draft.price);

        match contract.list_item(draft.price, draft.metadata.clone()).await {
            Ok(receipt) => {
                info!("Listed {} at price {}", draft.metadata, draft.price);
                metrics::LISTINGS.with_label_values(&["success"]).inc();
                Ok(receipt)
            }
            Err(e) => {
                error!("Listing {} failed: {}", draft.metadata, e);
                metrics::LISTINGS.with_label_values(&["error"]).inc();
                Err(e.into())
            }
        }
    }
}

/// One-shot listing submission.
pub async fn submit_listing(
    contract: &dyn ContractHandle,
    draft: &ListingDraft,
) -> Result<CallReceipt, ListingError> {
    ListingSubmitter::new().submit(contract, draft).await
}

/// Status-tracking wrapper for a listing form.
///
/// Validation failures leave the status untouched; only a submitted call
/// moves it through `Loading`.
#[derive(Debug, Clone)]
pub struct ListingForm {
    units: Units,
    status: ListingStatus,
}

impl ListingForm {
    pub fn new(units: Units) -> Self {
        Self {
            units,
            status: ListingStatus::None,
        }
    }

    pub fn status(&self) -> ListingStatus {
        self.status
    }

    pub async fn submit(
        &mut self,
        contract: &dyn ContractHandle,
        price_input: &str,
        metadata: &str,
    ) -> Result<CallReceipt, ListingError> {
        let draft = match ListingDraft::new(price_input, metadata, &self.units) {
            Ok(draft) => draft,
            Err(e) => {
                warn!("Rejected listing input: {}", e);
                metrics::LISTINGS.with_label_values(&["invalid"]).inc();
                return Err(e);
            }
        };

        self.status = self.status.begin()?;
        let result = submit_listing(contract, &draft).await;
        self.status = match &result {
            Ok(_) => self.status.succeed()?,
            Err(_) => self.status.fail()?,
        };
        result
    }

    /// Clear a finished submission so the form can be used again.
    pub fn reset(&mut self) -> Result<ListingStatus, TransitionError> {
        self.status = self.status.reset(true)?;
        Ok(self.status)
    }
}
