//! End-to-end tests with a mocked marketplace contract.
//!
//! These tests run the full server stack in-process with a mock
//! implementation of the contract and provider handles.

mod common;

use axum::http::StatusCode;
use marketplace_core::{
    testing::RecordedCall, AssetId, CallOptions, ContractError, Forward, PurchaseStatus,
};
use serde_json::json;

use common::{fixtures, TestConfig, TestFixture};

// =============================================================================
// Basic API Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_hides_gateway_token() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/config").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["contract"]["gateway_token_configured"], true);
    assert!(response.body["contract"].get("gateway_token").is_none());
    assert_eq!(response.body["units"]["price_decimals"], 9);
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/nonexistent").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Catalog Tests
// =============================================================================

#[tokio::test]
async fn test_catalog_before_first_load() {
    let fixture = TestFixture::with_items(2).await;
    let response = fixture.get("/api/v1/catalog").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "loading");
    assert_eq!(response.body["count"], 0);
    assert_eq!(response.body["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_reload_catalog() {
    let fixture = TestFixture::with_items(3).await;

    let response = fixture.post_empty("/api/v1/catalog/reload").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "success");
    assert_eq!(response.body["count"], 3);
    let items = response.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["id"], 1);
    assert_eq!(items[0]["price"], fixtures::DEFAULT_PRICE);
    assert_eq!(items[0]["price_display"], "0.000000015");
    assert_eq!(items[0]["metadata"], "item_000000000000001");
    assert_eq!(items[0]["purchase"], "none");
    assert_eq!(items[0]["can_buy"], true);
}

#[tokio::test]
async fn test_empty_catalog() {
    let fixture = TestFixture::new().await;

    let response = fixture.post_empty("/api/v1/catalog/reload").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "success");
    assert_eq!(response.body["count"], 0);
    assert_eq!(
        fixture.contract.recorded_calls().await,
        vec![RecordedCall::GetCount]
    );
}

#[tokio::test]
async fn test_reload_failure_hides_cause() {
    let fixture = TestFixture::with_items(2).await;
    fixture
        .contract
        .fail_item(2, ContractError::Reverted("secret revert detail".to_string()))
        .await;

    let response = fixture.post_empty("/api/v1/catalog/reload").await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"], "Something went wrong, try again.");

    let response = fixture.get("/api/v1/catalog").await;
    assert_eq!(response.body["status"], "error");
    assert_eq!(response.body["items"].as_array().unwrap().len(), 0);
}

// =============================================================================
// Purchase Tests
// =============================================================================

#[tokio::test]
async fn test_buy_item() {
    let fixture = TestFixture::with_items(5).await;
    fixture
        .contract
        .set_base_asset(AssetId::parse("0xAA").unwrap())
        .await;
    fixture.contract.add_item(fixtures::item_with_price(5, 1000)).await;
    fixture.post_empty("/api/v1/catalog/reload").await;

    let response = fixture.post_empty("/api/v1/items/5/buy").await;

    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(response.body["item_id"], 5);
    assert_eq!(response.body["amount"], 1000);
    assert_eq!(response.body["asset_id"], "0xaa");

    assert_eq!(
        fixture.contract.last_buy().await,
        Some((
            5,
            CallOptions {
                forward: Some(Forward {
                    amount: 1000,
                    asset_id: AssetId::parse("0xaa").unwrap(),
                }),
                variable_outputs: 1,
            }
        ))
    );

    let response = fixture.get("/api/v1/catalog").await;
    assert_eq!(response.body["items"][4]["purchase"], "success");
}

#[tokio::test]
async fn test_buy_unknown_item_returns_404() {
    let fixture = TestFixture::with_items(1).await;
    fixture.post_empty("/api/v1/catalog/reload").await;

    let response = fixture.post_empty("/api/v1/items/99/buy").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(fixture.contract.last_buy().await.is_none());
}

#[tokio::test]
async fn test_buy_twice_returns_409() {
    let fixture = TestFixture::with_config(TestConfig {
        items: 1,
        allow_repurchase: false,
    })
    .await;
    fixture.post_empty("/api/v1/catalog/reload").await;

    let response = fixture.post_empty("/api/v1/items/1/buy").await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    let response = fixture.post_empty("/api/v1/items/1/buy").await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    // Repurchase disabled: success cannot be reset
    let response = fixture.post_empty("/api/v1/items/1/reset").await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_failed_buy_then_reset_and_retry() {
    let fixture = TestFixture::with_items(1).await;
    fixture.post_empty("/api/v1/catalog/reload").await;
    fixture.contract.fail_buy("NotEnoughTokens").await;

    let response = fixture.post_empty("/api/v1/items/1/buy").await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"], "Something went wrong, try again.");
    assert_eq!(
        fixture.state.view().purchase_status(1).await,
        Some(PurchaseStatus::Error)
    );

    let response = fixture.post_empty("/api/v1/items/1/reset").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["purchase"], "none");

    fixture.contract.clear_buy_failure().await;
    let response = fixture.post_empty("/api/v1/items/1/buy").await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_invalid_item_id_is_rejected() {
    let fixture = TestFixture::with_items(1).await;
    let response = fixture.post_empty("/api/v1/items/abc/buy").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Listing Tests
// =============================================================================

#[tokio::test]
async fn test_create_listing() {
    let fixture = TestFixture::with_items(1).await;

    let response = fixture
        .post(
            "/api/v1/listings",
            json!({ "price": "0.5", "metadata": "metadata__url__here_" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["price"], 500_000_000u64);
    assert_eq!(
        fixture.contract.recorded_calls().await,
        vec![RecordedCall::ListItem {
            price: 500_000_000,
            metadata: fixtures::metadata("metadata__url__here_"),
        }]
    );

    let response = fixture.post_empty("/api/v1/catalog/reload").await;
    assert_eq!(response.body["count"], 2);
}

#[tokio::test]
async fn test_create_listing_validation() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/listings",
            json!({ "price": "0.5", "metadata": "too short" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = fixture
        .post(
            "/api/v1/listings",
            json!({ "price": "lots", "metadata": "metadata__url__here_" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert_eq!(fixture.contract.call_count().await, 0);
}

#[tokio::test]
async fn test_create_listing_remote_failure() {
    let fixture = TestFixture::new().await;
    fixture
        .contract
        .set_next_error(ContractError::Reverted("OnlyOwner".to_string()))
        .await;

    let response = fixture
        .post(
            "/api/v1/listings",
            json!({ "price": "1", "metadata": "metadata__url__here_" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"], "Something went wrong, try again.");
}

#[tokio::test]
async fn test_create_listing_malformed_json() {
    let fixture = TestFixture::new().await;
    let response = fixture.post_raw("/api/v1/listings", "{not json").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Metrics Tests
// =============================================================================

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::with_items(2).await;
    fixture.post_empty("/api/v1/catalog/reload").await;

    let (status, body) = fixture.get_text("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("marketplace_catalog_items 2"));
    assert!(body.contains("marketplace_catalog_loads_total"));
    assert!(body.contains("marketplace_http_requests_total"));
}
