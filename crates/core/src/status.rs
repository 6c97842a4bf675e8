//! Status machines for catalog loads and per-item transactions.
//!
//! ```text
//! LoadStatus:      Loading -> Success
//!                     |
//!                     v
//!                   Error
//!                  (begin: any -> Loading, a fresh load)
//!
//! PurchaseStatus:  None -> Loading -> Success
//!                    ^        |         |
//!                    |        v         |
//!                    +----- Error       |
//!                    +------------------+ (reset, policy-gated)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A status change that the machine does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid status transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: &'static str,
    pub to: &'static str,
}

/// Status of a catalog load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    #[default]
    Loading,
    Success,
    Error,
}

impl LoadStatus {
    /// Start a fresh load. Allowed from every state.
    pub fn begin(self) -> Self {
        LoadStatus::Loading
    }

    /// Finish the current load successfully.
    pub fn succeed(self) -> Result<Self, TransitionError> {
        self.finish(LoadStatus::Success)
    }

    /// Finish the current load with an error.
    pub fn fail(self) -> Result<Self, TransitionError> {
        self.finish(LoadStatus::Error)
    }

    fn finish(self, to: LoadStatus) -> Result<Self, TransitionError> {
        match self {
            LoadStatus::Loading => Ok(to),
            _ => Err(TransitionError {
                from: self.as_str(),
                to: to.as_str(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStatus::Loading => "loading",
            LoadStatus::Success => "success",
            LoadStatus::Error => "error",
        }
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a transaction started from one item (a purchase or a listing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    #[default]
    None,
    Loading,
    Success,
    Error,
}

/// Listing submissions follow the same machine as purchases.
pub type ListingStatus = PurchaseStatus;

impl PurchaseStatus {
    /// Start a submission. Only allowed from `None`.
    pub fn begin(self) -> Result<Self, TransitionError> {
        match self {
            PurchaseStatus::None => Ok(PurchaseStatus::Loading),
            _ => Err(self.invalid(PurchaseStatus::Loading)),
        }
    }

    pub fn succeed(self) -> Result<Self, TransitionError> {
        self.finish(PurchaseStatus::Success)
    }

    pub fn fail(self) -> Result<Self, TransitionError> {
        self.finish(PurchaseStatus::Error)
    }

    /// Return to `None` so a new submission can start.
    ///
    /// `Error` can always be reset. `Success` only when `allow_repeat` is set.
    pub fn reset(self, allow_repeat: bool) -> Result<Self, TransitionError> {
        match self {
            PurchaseStatus::None | PurchaseStatus::Error => Ok(PurchaseStatus::None),
            PurchaseStatus::Success if allow_repeat => Ok(PurchaseStatus::None),
            _ => Err(self.invalid(PurchaseStatus::None)),
        }
    }

    /// Whether the action for this item may be offered to the user.
    pub fn is_actionable(&self) -> bool {
        matches!(self, PurchaseStatus::None)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PurchaseStatus::Success | PurchaseStatus::Error)
    }

    fn finish(self, to: PurchaseStatus) -> Result<Self, TransitionError> {
        match self {
            PurchaseStatus::Loading => Ok(to),
            _ => Err(self.invalid(to)),
        }
    }

    fn invalid(self, to: PurchaseStatus) -> TransitionError {
        TransitionError {
            from: self.as_str(),
            to: to.as_str(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::None => "none",
            PurchaseStatus::Loading => "loading",
            PurchaseStatus::Success => "success",
            PurchaseStatus::Error => "error",
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
