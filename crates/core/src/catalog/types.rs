use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::contract::Item;

/// Items read from the contract by one successful load.
///
/// Only produced by a completed load, so `items().len() == count()` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    count: u64,
    items: Vec<Item>,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    pub(crate) fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub(crate) fn new(items: Vec<Item>) -> Self {
        Self {
            count: items.len() as u64,
            items,
            loaded_at: Utc::now(),
        }
    }

    /// Number of items reported by the contract at load time.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Items in fetch order (ascending id).
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Look up an item by contract id.
    pub fn get(&self, id: u64) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }
}
