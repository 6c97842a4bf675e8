//! Listing API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;
use marketplace_core::{metrics::LISTINGS, ListingDraft, ListingError};

use super::handlers::{api_error, ApiError, GENERIC_ERROR};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    /// Decimal amount in base asset units (e.g. "0.5").
    pub price: String,
    /// Exactly 20 letters, digits or underscores.
    pub metadata: String,
}

#[derive(Debug, Serialize)]
pub struct CreateListingResponse {
    /// Price in native units.
    pub price: u64,
    pub metadata: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
}

/// POST /api/v1/listings
///
/// Validate and submit a new listing.
pub async fn create_listing(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<CreateListingResponse>), ApiError> {
    let draft = ListingDraft::new(&request.price, &request.metadata, state.units()).map_err(|e| {
        warn!("Rejected listing: {}", e);
        LISTINGS.with_label_values(&["invalid"]).inc();
        api_error(StatusCode::BAD_REQUEST, e.to_string())
    })?;

    match state.listings().submit(state.contract(), &draft).await {
        Ok(receipt) => Ok((
            StatusCode::CREATED,
            Json(CreateListingResponse {
                price: draft.price,
                metadata: draft.metadata.to_string(),
                tx_id: receipt.tx_id,
            }),
        )),
        Err(ListingError::Invalid(msg)) => Err(api_error(StatusCode::BAD_REQUEST, msg)),
        Err(_) => Err(api_error(StatusCode::BAD_GATEWAY, GENERIC_ERROR)),
    }
}
