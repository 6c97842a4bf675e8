//! Prometheus metrics for the marketplace workflows.
//!
//! This module provides metrics for:
//! - Catalog loads (results, duration, item fetches)
//! - Purchases
//! - Listings

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Catalog Metrics
// =============================================================================

/// Catalog loads total by result.
pub static CATALOG_LOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("marketplace_catalog_loads_total", "Total catalog loads"),
        &["result"], // "success", "error"
    )
    .unwrap()
});

/// Catalog load duration in seconds.
pub static CATALOG_LOAD_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "marketplace_catalog_load_duration_seconds",
            "Duration of a full catalog load",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["result"],
    )
    .unwrap()
});

/// Item records fetched from the contract.
pub static ITEMS_FETCHED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "marketplace_items_fetched_total",
        "Total item records fetched from the contract",
    )
    .unwrap()
});

// =============================================================================
// Transaction Metrics
// =============================================================================

/// Purchases total by result.
pub static PURCHASES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("marketplace_purchases_total", "Total purchase submissions"),
        &["result"], // "success", "error"
    )
    .unwrap()
});

/// Listings total by result.
pub static LISTINGS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("marketplace_listings_total", "Total listing submissions"),
        &["result"], // "success", "invalid", "error"
    )
    .unwrap()
});

/// All core metrics, for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CATALOG_LOADS.clone()),
        Box::new(CATALOG_LOAD_DURATION.clone()),
        Box::new(ITEMS_FETCHED.clone()),
        Box::new(PURCHASES.clone()),
        Box::new(LISTINGS.clone()),
    ]
}
