use crate::contract::{ContractHandle, Item, ProviderHandle};
use crate::status::{PurchaseStatus, TransitionError};

use super::{PurchaseError, PurchaseReceipt, PurchaseSubmitter};

/// Purchase status of a single item.
///
/// Starts at `None`; a purchase moves it through `Loading` to `Success` or
/// `Error`. It never goes back to `None` on its own.
#[derive(Debug, Clone)]
pub struct PurchaseTracker {
    status: PurchaseStatus,
    allow_repurchase: bool,
}

impl PurchaseTracker {
    pub fn new(allow_repurchase: bool) -> Self {
        Self {
            status: PurchaseStatus::None,
            allow_repurchase,
        }
    }

    pub fn status(&self) -> PurchaseStatus {
        self.status
    }

    /// Whether a buy action may be offered for this item.
    pub fn can_buy(&self) -> bool {
        self.status.is_actionable()
    }

    /// Whether [`reset`](Self::reset) would succeed.
    pub fn can_reset(&self) -> bool {
        self.status.reset(self.allow_repurchase).is_ok()
    }

    /// `None -> Loading`.
    pub fn begin(&mut self) -> Result<PurchaseStatus, TransitionError> {
        self.status = self.status.begin()?;
        Ok(self.status)
    }

    /// `Loading -> Success | Error`, depending on `result`.
    pub fn complete<T, E>(
        &mut self,
        result: &Result<T, E>,
    ) -> Result<PurchaseStatus, TransitionError> {
        self.status = match result {
            Ok(_) => self.status.succeed()?,
            Err(_) => self.status.fail()?,
        };
        Ok(self.status)
    }

    /// Back to `None`; from `Success` only if repurchase is allowed.
    pub fn reset(&mut self) -> Result<PurchaseStatus, TransitionError> {
        self.status = self.status.reset(self.allow_repurchase)?;
        Ok(self.status)
    }

    /// Run a whole purchase for `item` and record the outcome.
    pub async fn buy(
        &mut self,
        submitter: &PurchaseSubmitter,
        contract: &dyn ContractHandle,
        provider: &dyn ProviderHandle,
        item: &Item,
    ) -> Result<PurchaseReceipt, PurchaseError> {
        self.begin()?;
        let result = submitter.submit(contract, provider, item).await;
        self.complete(&result)?;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockContract};

    #[tokio::test]
    async fn test_buy_success() {
        let contract = MockContract::new();
        let mut tracker = PurchaseTracker::new(false);

        tracker
            .buy(
                &PurchaseSubmitter::default(),
                &contract,
                &contract,
                &fixtures::item(1),
            )
            .await
            .unwrap();

        assert_eq!(tracker.status(), PurchaseStatus::Success);
        assert!(!tracker.can_buy());
        assert!(!tracker.can_reset());
    }

    #[tokio::test]
    async fn test_buy_failure_then_reset_and_retry() {
        let contract = MockContract::new();
        contract.fail_buy("NotEnoughTokens").await;
        let submitter = PurchaseSubmitter::default();
        let item = fixtures::item(1);
        let mut tracker = PurchaseTracker::new(false);

        let result = tracker.buy(&submitter, &contract, &contract, &item).await;
        assert!(matches!(result, Err(PurchaseError::Remote(_))));
        assert_eq!(tracker.status(), PurchaseStatus::Error);

        // A second buy without reset is refused before any call is made.
        let calls_before = contract.call_count().await;
        let result = tracker.buy(&submitter, &contract, &contract, &item).await;
        assert!(matches!(result, Err(PurchaseError::InvalidState(_))));
        assert_eq!(contract.call_count().await, calls_before);

        contract.clear_buy_failure().await;
        tracker.reset().unwrap();
        tracker
            .buy(&submitter, &contract, &contract, &item)
            .await
            .unwrap();
        assert_eq!(tracker.status(), PurchaseStatus::Success);
    }

    #[test]
    fn test_repurchase_policy() {
        let mut tracker = PurchaseTracker::new(true);
        tracker.begin().unwrap();
        tracker.complete(&Ok::<(), ()>(())).unwrap();
        assert!(tracker.can_reset());
        assert_eq!(tracker.reset().unwrap(), PurchaseStatus::None);
        assert!(tracker.can_buy());
    }

    #[test]
    fn test_complete_without_begin_is_rejected() {
        let mut tracker = PurchaseTracker::new(true);
        assert!(tracker.complete(&Err::<(), ()>(())).is_err());
        assert_eq!(tracker.status(), PurchaseStatus::None);
    }
}
