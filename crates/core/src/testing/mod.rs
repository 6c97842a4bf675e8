//! Testing utilities and mock implementations.
//!
//! [`MockContract`] stands in for both the marketplace contract and the
//! provider, so the loader, submitter and view can be exercised without a
//! node or gateway.
//!
//! # Example
//!
//! ```rust,ignore
//! use marketplace_core::testing::{fixtures, MockContract};
//!
//! let contract = MockContract::with_items(fixtures::items(3)).await;
//! contract.fail_buy("NotEnoughTokens").await;
//!
//! // Use as both handles...
//! submit_purchase(&contract, &contract, &fixtures::item(1)).await;
//! ```

mod mock_contract;

pub use mock_contract::{MockContract, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::contract::{Address, Identity, Item, Metadata};

    /// Price used for fixture items (0.000000015 with 9 decimals).
    pub const DEFAULT_PRICE: u64 = 15;

    /// Metadata from a literal that is known to be 20 ASCII characters.
    pub fn metadata(raw: &str) -> Metadata {
        Metadata::new(raw).expect("fixture metadata must be 20 ASCII characters")
    }

    /// Deterministic metadata for an item id (`item_000000000000001`).
    pub fn metadata_for(id: u64) -> Metadata {
        metadata(&format!("item_{:015}", id))
    }

    /// Owner used for fixture items.
    pub fn owner() -> Identity {
        Identity::Address(Address::zeroed())
    }

    /// Create a test item with reasonable defaults.
    pub fn item(id: u64) -> Item {
        item_with_price(id, DEFAULT_PRICE)
    }

    /// Create a test item with a specific price.
    pub fn item_with_price(id: u64, price: u64) -> Item {
        Item {
            id,
            price,
            owner: owner(),
            metadata: metadata_for(id),
            total_bought: 0,
        }
    }

    /// Items with ids `1..=n`.
    pub fn items(n: u64) -> Vec<Item> {
        (1..=n).map(item).collect()
    }
}
