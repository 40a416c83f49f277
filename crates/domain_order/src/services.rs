//! Order domain services
//!
//! The synchronous surface of the lifecycle: creating orders, reading them
//! back, and cancelling them on request.

use std::sync::Arc;

use core_kernel::{Clock, OrderId};

use crate::error::OrderError;
use crate::order::{NewOrder, Order, OrderStatus};
use crate::orchestrator::WorkflowOrchestrator;
use crate::ports::{EventPublisher, OrderRepository};

/// Service for the request/response side of the order lifecycle
pub struct OrderService {
    repository: Arc<dyn OrderRepository>,
    publisher: Arc<dyn EventPublisher>,
    orchestrator: Arc<WorkflowOrchestrator>,
    clock: Arc<dyn Clock>,
}

impl OrderService {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        publisher: Arc<dyn EventPublisher>,
        orchestrator: Arc<WorkflowOrchestrator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            publisher,
            orchestrator,
            clock,
        }
    }

    /// Creates an order in RECEIVED and announces it
    ///
    /// The repository assigns the id. Publishing RECEIVED is what starts
    /// underwriting on the asynchronous side.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` for rejected input and
    /// `OrderError::Infrastructure` if the save or the publish fails. A failed
    /// publish leaves the saved order in place.
    pub async fn create_order(&self, new_order: NewOrder) -> Result<Order, OrderError> {
        let order = Order::receive(new_order, self.clock.now())?;
        let saved = self.repository.save(order).await?;
        let order_id = saved
            .id()
            .ok_or_else(|| OrderError::validation("repository returned an order without id"))?;

        self.publisher
            .publish_status(order_id, OrderStatus::Received)
            .await?;

        tracing::info!(
            order_id = %order_id,
            customer_id = %saved.customer_id(),
            category = %saved.category(),
            "Order received"
        );
        Ok(saved)
    }

    /// Loads one order
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        Ok(self.repository.find_by_id(order_id).await?)
    }

    /// Lists a customer's orders, oldest first
    pub async fn list_orders_by_customer(&self, customer_id: &str) -> Result<Vec<Order>, OrderError> {
        Ok(self.repository.find_all_by_customer(customer_id).await?)
    }

    /// Cancels an order; fails for approved or rejected orders
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.orchestrator.handle_cancel(order_id).await
    }
}

impl std::fmt::Debug for OrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_kernel::FixedClock;
    use rust_decimal_macros::dec;
    use std::collections::{BTreeMap, BTreeSet};

    use crate::order::Category;
    use crate::ports::mock::*;
    use crate::risk::Classification;

    fn service() -> (OrderService, Arc<RecordingEventPublisher>) {
        let repository = Arc::new(InMemoryOrderRepository::new());
        let publisher = Arc::new(RecordingEventPublisher::new());
        let clock: Arc<dyn Clock> =
            Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap()));
        let orchestrator = Arc::new(WorkflowOrchestrator::new(
            repository.clone(),
            Arc::new(InMemoryIdempotencyCache::new()),
            publisher.clone(),
            Arc::new(StubRiskClassifier::new(Classification::Regular)),
            clock.clone(),
        ));
        (
            OrderService::new(repository, publisher.clone(), orchestrator, clock),
            publisher,
        )
    }

    fn new_order(customer_id: &str) -> NewOrder {
        NewOrder {
            customer_id: customer_id.to_string(),
            product_id: "PROD-7".to_string(),
            category: Category::Life,
            sales_channel: "WEB".to_string(),
            payment_method: "BOLETO".to_string(),
            total_monthly_premium_amount: dec!(120.00),
            insured_amount: dec!(150000),
            coverages: BTreeMap::new(),
            assistances: BTreeSet::new(),
        }
    }

    #[tokio::test]
    async fn test_create_order_publishes_received() {
        let (service, publisher) = service();
        let order = service.create_order(new_order("CUST-1")).await.unwrap();

        let id = order.id().unwrap();
        assert_eq!(order.status(), OrderStatus::Received);
        assert_eq!(publisher.published().await, vec![(id, OrderStatus::Received)]);
        assert_eq!(service.get_order(id).await.unwrap(), order);
    }

    #[tokio::test]
    async fn test_get_missing_order_is_not_found() {
        let (service, _) = service();
        let error = service.get_order(OrderId::new_v7()).await.unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn test_list_by_customer() {
        let (service, _) = service();
        service.create_order(new_order("CUST-1")).await.unwrap();
        service.create_order(new_order("CUST-1")).await.unwrap();
        service.create_order(new_order("CUST-2")).await.unwrap();

        assert_eq!(service.list_orders_by_customer("CUST-1").await.unwrap().len(), 2);
        assert!(service.list_orders_by_customer("CUST-3").await.unwrap().is_empty());
    }
}
