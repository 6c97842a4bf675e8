//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock contract injected, enabling E2E testing without a node or
//! wallet gateway.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use marketplace_core::{
    testing::MockContract, Config, ContractConfig, ContractId, PurchaseConfig, ServerConfig,
    Units,
};
use marketplace_server::state::AppState;

/// Re-export fixtures for test convenience
pub use marketplace_core::testing::fixtures;

/// Test fixture for E2E testing with a mock contract.
///
/// The same [`MockContract`] serves as contract and provider handle.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_buy() {
///     let fixture = TestFixture::with_items(2).await;
///     fixture.post_empty("/api/v1/catalog/reload").await;
///
///     let response = fixture.post_empty("/api/v1/items/1/buy").await;
///     assert_eq!(response.status, 202);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock contract - configure items and failures
    pub contract: Arc<MockContract>,
    /// Shared state, for direct access to the catalog view
    pub state: Arc<AppState>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with an empty contract.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with `n` listed items.
    pub async fn with_items(n: u64) -> Self {
        Self::with_config(TestConfig {
            items: n,
            ..Default::default()
        })
        .await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let contract = Arc::new(MockContract::with_items(fixtures::items(test_config.items)).await);

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            contract: ContractConfig {
                id: ContractId::zeroed(),
                gateway_url: "http://127.0.0.1:1/rpc".to_string(),
                gateway_token: Some("test-token".to_string()),
                timeout_secs: 5,
            },
            units: Units::default(),
            purchase: PurchaseConfig {
                variable_outputs: 1,
                allow_repurchase: test_config.allow_repurchase,
            },
        };

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&contract) as Arc<dyn marketplace_core::ContractHandle>,
            Arc::clone(&contract) as Arc<dyn marketplace_core::ProviderHandle>,
        ));

        let router = marketplace_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            contract,
            state,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a GET request and return the raw body as text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let (status, bytes) = self.send(request).await;
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.collect_response(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.collect_response(request).await
    }

    async fn collect_response(&self, request: Request<Body>) -> TestResponse {
        let (status, body_bytes) = self.send(request).await;

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, body_bytes.to_vec())
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Items listed on the mock contract (ids 1..=items)
    pub items: u64,
    /// Whether an item can be bought again after a reset
    pub allow_repurchase: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            items: 0,
            allow_repurchase: true,
        }
    }
}
