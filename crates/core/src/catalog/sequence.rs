//! Lazy, bounded walk over item ids `1..=count`.

use futures::stream::{self, Stream};
use thiserror::Error;

use crate::contract::{ContractError, ContractHandle, Item};

/// A failed `get_item` call, tagged with the id being fetched.
#[derive(Debug, Error)]
#[error("failed to fetch item {id}: {source}")]
pub struct FetchError {
    pub id: u64,
    #[source]
    pub source: ContractError,
}

/// Fetches items one at a time, in ascending id order.
///
/// Each call to [`next`](Self::next) issues exactly one `get_item` and waits
/// for it. The sequence ends after `count` items or after the first failure,
/// and cannot be restarted.
pub struct ItemSequence<'a> {
    contract: &'a dyn ContractHandle,
    next_id: u64,
    count: u64,
    done: bool,
}

impl<'a> ItemSequence<'a> {
    pub fn new(contract: &'a dyn ContractHandle, count: u64) -> Self {
        Self {
            contract,
            next_id: 1,
            count,
            done: count == 0,
        }
    }

    /// Ids not fetched yet (0 once the sequence has ended).
    pub fn remaining(&self) -> u64 {
        if self.done {
            0
        } else {
            self.count - self.next_id + 1
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Fetch the next item, or `None` once the sequence has ended.
    pub async fn next(&mut self) -> Option<Result<Item, FetchError>> {
        if self.done {
            return None;
        }

        let id = self.next_id;
        if id == self.count {
            self.done = true;
        } else {
            self.next_id = id + 1;
        }

        match self.contract.get_item(id).await {
            Ok(item) => Some(Ok(item)),
            Err(source) => {
                self.done = true;
                Some(Err(FetchError { id, source }))
            }
        }
    }

    /// Adapt into a [`Stream`] with the same ordering and stop-on-error behavior.
    pub fn into_stream(self) -> impl Stream<Item = Result<Item, FetchError>> + Send + 'a {
        stream::unfold(self, |mut seq| async move {
            let next = seq.next().await?;
            Some((next, seq))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ContractError;
    use crate::testing::{fixtures, MockContract, RecordedCall};
    use futures::StreamExt;

    #[tokio::test]
    async fn test_empty_sequence_makes_no_calls() {
        let contract = MockContract::new();
        let mut seq = ItemSequence::new(&contract, 0);

        assert!(seq.is_done());
        assert_eq!(seq.remaining(), 0);
        assert!(seq.next().await.is_none());
        assert_eq!(contract.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_fetches_ascending_and_stops() {
        let contract = MockContract::with_items(fixtures::items(3)).await;
        let mut seq = ItemSequence::new(&contract, 3);

        assert_eq!(seq.remaining(), 3);
        let mut ids = Vec::new();
        while let Some(result) = seq.next().await {
            ids.push(result.unwrap().id);
        }

        assert_eq!(ids, vec![1, 2, 3]);
        assert!(seq.next().await.is_none());
        assert_eq!(
            contract.recorded_calls().await,
            vec![
                RecordedCall::GetItem { id: 1 },
                RecordedCall::GetItem { id: 2 },
                RecordedCall::GetItem { id: 3 },
            ]
        );
    }

    #[tokio::test]
    async fn test_stops_after_first_failure() {
        let contract = MockContract::with_items(fixtures::items(4)).await;
        contract
            .fail_item(2, ContractError::Reverted("InvalidItem".to_string()))
            .await;
        let mut seq = ItemSequence::new(&contract, 4);

        assert!(seq.next().await.unwrap().is_ok());
        let err = seq.next().await.unwrap().unwrap_err();
        assert_eq!(err.id, 2);
        assert!(seq.is_done());
        assert!(seq.next().await.is_none());
        assert_eq!(contract.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_stream_adapter() {
        let contract = MockContract::with_items(fixtures::items(2)).await;
        let items: Vec<_> = ItemSequence::new(&contract, 2).into_stream().collect().await;

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|r| r.is_ok()));
    }

    #[tokio::test]
    async fn test_max_count_does_not_overflow() {
        let contract = MockContract::new();
        contract
            .fail_item(1, ContractError::InvalidResponse("boom".to_string()))
            .await;
        let mut seq = ItemSequence::new(&contract, u64::MAX);

        assert_eq!(seq.remaining(), u64::MAX);
        assert!(seq.next().await.unwrap().is_err());
        assert_eq!(seq.remaining(), 0);
    }
}
