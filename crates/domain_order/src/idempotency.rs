//! Payment idempotency guard
//!
//! A marker keyed by order id holds the payment id. Its presence means a
//! payment has been recorded for the order and not yet consumed by an
//! approval.

use std::sync::Arc;

use core_kernel::{OrderId, PortError};

use crate::ports::IdempotencyCache;

/// Result of trying to record a payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The marker was stored
    Recorded,
    /// A marker was already present; holds the payment id it carries
    AlreadyRecorded(Option<String>),
}

/// Guard over the idempotency cache for payment markers
#[derive(Clone)]
pub struct IdempotencyGuard {
    cache: Arc<dyn IdempotencyCache>,
}

impl IdempotencyGuard {
    pub fn new(cache: Arc<dyn IdempotencyCache>) -> Self {
        Self { cache }
    }

    fn key(order_id: OrderId) -> String {
        order_id.as_uuid().to_string()
    }

    /// Payment id recorded for the order, if any
    pub async fn payment_for(&self, order_id: OrderId) -> Result<Option<String>, PortError> {
        self.cache.get(&Self::key(order_id)).await
    }

    /// Atomically records a payment unless one is already present
    pub async fn record_payment(
        &self,
        order_id: OrderId,
        payment_id: &str,
    ) -> Result<RecordOutcome, PortError> {
        let key = Self::key(order_id);
        if self.cache.put_if_absent(&key, payment_id).await? {
            Ok(RecordOutcome::Recorded)
        } else {
            let existing = self.cache.get(&key).await?;
            Ok(RecordOutcome::AlreadyRecorded(existing))
        }
    }

    /// Removes the marker once the approval has consumed it
    pub async fn consume(&self, order_id: OrderId) -> Result<bool, PortError> {
        self.cache.delete(&Self::key(order_id)).await
    }
}

impl std::fmt::Debug for IdempotencyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdempotencyGuard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::InMemoryIdempotencyCache;

    #[tokio::test]
    async fn test_record_then_consume() {
        let guard = IdempotencyGuard::new(Arc::new(InMemoryIdempotencyCache::new()));
        let order_id = OrderId::new_v7();

        assert_eq!(guard.payment_for(order_id).await.unwrap(), None);
        assert_eq!(
            guard.record_payment(order_id, "PAY-1").await.unwrap(),
            RecordOutcome::Recorded
        );
        assert_eq!(guard.payment_for(order_id).await.unwrap().as_deref(), Some("PAY-1"));

        assert!(guard.consume(order_id).await.unwrap());
        assert_eq!(guard.payment_for(order_id).await.unwrap(), None);
        assert!(!guard.consume(order_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_second_record_keeps_first_payment() {
        let guard = IdempotencyGuard::new(Arc::new(InMemoryIdempotencyCache::new()));
        let order_id = OrderId::new_v7();

        guard.record_payment(order_id, "PAY-1").await.unwrap();
        let second = guard.record_payment(order_id, "PAY-2").await.unwrap();

        assert_eq!(second, RecordOutcome::AlreadyRecorded(Some("PAY-1".to_string())));
    }
}
