//! Catalog and purchase API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::warn;
use marketplace_core::{CatalogSnapshot, PurchaseReceipt, PurchaseStatus, ViewError};

use super::handlers::{api_error, ApiError, GENERIC_ERROR};
use crate::state::AppState;

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub id: u64,
    pub purchase: PurchaseStatus,
}

/// Map a view error to an HTTP status. Remote failures never expose their cause.
fn view_error(err: ViewError) -> ApiError {
    match err {
        ViewError::UnknownItem(id) => {
            api_error(StatusCode::NOT_FOUND, format!("Item not found: {}", id))
        }
        ViewError::PurchaseUnavailable { id, source } => api_error(
            StatusCode::CONFLICT,
            format!(
                "Purchase of item {} is not available while it is {}",
                id, source.from
            ),
        ),
        ViewError::Disposed => api_error(StatusCode::SERVICE_UNAVAILABLE, "Shutting down"),
        ViewError::InvalidState(e) => {
            warn!("Unexpected view transition: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR)
        }
        ViewError::Load(_) | ViewError::Purchase(_) => {
            api_error(StatusCode::BAD_GATEWAY, GENERIC_ERROR)
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/catalog
///
/// Current load status and items with their purchase status.
pub async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<CatalogSnapshot> {
    Json(state.view().snapshot().await)
}

/// POST /api/v1/catalog/reload
///
/// Run a fresh load and return the resulting snapshot.
pub async fn reload_catalog(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CatalogSnapshot>, ApiError> {
    state
        .view()
        .reload(state.contract())
        .await
        .map_err(view_error)?;
    Ok(Json(state.view().snapshot().await))
}

/// POST /api/v1/items/{id}/buy
///
/// Buy one item at its listed price.
pub async fn buy_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<(StatusCode, Json<PurchaseReceipt>), ApiError> {
    let receipt = state
        .view()
        .buy(id, state.contract(), state.provider())
        .await
        .map_err(view_error)?;
    Ok((StatusCode::ACCEPTED, Json(receipt)))
}

/// POST /api/v1/items/{id}/reset
///
/// Clear a finished purchase so the item can be bought again.
pub async fn reset_purchase(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<ResetResponse>, ApiError> {
    let purchase = state.view().reset_purchase(id).await.map_err(view_error)?;
    Ok(Json(ResetResponse { id, purchase }))
}
