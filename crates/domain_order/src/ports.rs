//! Order Domain Ports
//!
//! Port interfaces for the collaborators the lifecycle depends on. Each has
//! at least one production adapter and an in-memory mock:
//!
//! - **OrderRepository**: PostgreSQL document store (infra_db)
//! - **IdempotencyCache**: PostgreSQL marker table (infra_db)
//! - **EventPublisher**: in-process bus (interface_api)
//! - **RiskClassifier**: REST scoring service ([`crate::adapters`])
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_order::ports::OrderRepository;
//! use std::sync::Arc;
//!
//! pub struct OrderQueries {
//!     repository: Arc<dyn OrderRepository>,
//! }
//!
//! impl OrderQueries {
//!     pub async fn get(&self, id: OrderId) -> Result<Order, PortError> {
//!         self.repository.find_by_id(id).await
//!     }
//! }
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, OrderId, PortError};

use crate::order::{Order, OrderStatus};
use crate::risk::RiskClassification;

/// Persistence for order aggregates
///
/// Saves are last-write-wins; no version check is performed.
#[async_trait]
pub trait OrderRepository: DomainPort {
    /// Stores the order, assigning an id when it has none
    async fn save(&self, order: Order) -> Result<Order, PortError>;

    /// Loads an order, failing with `PortError::NotFound` if absent
    async fn find_by_id(&self, id: OrderId) -> Result<Order, PortError>;

    /// All orders of one customer, possibly empty
    async fn find_all_by_customer(&self, customer_id: &str) -> Result<Vec<Order>, PortError>;
}

/// Key/value store backing the idempotency guard
#[async_trait]
pub trait IdempotencyCache: DomainPort {
    async fn get(&self, key: &str) -> Result<Option<String>, PortError>;

    async fn put(&self, key: &str, value: &str) -> Result<(), PortError>;

    /// Stores the value only if the key is absent; returns true if it stored
    async fn put_if_absent(&self, key: &str, value: &str) -> Result<bool, PortError>;

    /// Removes the key; returns true if it was present
    async fn delete(&self, key: &str) -> Result<bool, PortError>;
}

/// Outbound "order status changed" channel
#[async_trait]
pub trait EventPublisher: DomainPort {
    async fn publish_status(&self, order_id: OrderId, status: OrderStatus) -> Result<(), PortError>;
}

/// External risk scoring service
#[async_trait]
pub trait RiskClassifier: DomainPort {
    /// Classifies the customer behind an order
    ///
    /// Fails if the service does not answer with success or answers without
    /// a result.
    async fn classify(&self, order: &Order) -> Result<RiskClassification, PortError>;
}

// ============================================================================
// Mock Implementations
// ============================================================================

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use crate::risk::Classification;

    /// In-memory mock implementation of OrderRepository
    #[derive(Debug, Default)]
    pub struct InMemoryOrderRepository {
        orders: Arc<RwLock<HashMap<OrderId, Order>>>,
        saves: AtomicUsize,
        fail_saves: AtomicBool,
    }

    impl InMemoryOrderRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with orders, assigning ids where missing
        pub async fn with_orders(orders: Vec<Order>) -> Self {
            let repository = Self::new();
            for mut order in orders {
                let id = match order.id() {
                    Some(id) => id,
                    None => {
                        let id = OrderId::new_v7();
                        let _ = order.assign_id(id);
                        id
                    }
                };
                repository.orders.write().await.insert(id, order);
            }
            repository
        }

        /// Number of successful saves since creation
        pub fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }

        /// Makes every subsequent save fail with a connection error
        pub fn set_failing(&self, failing: bool) {
            self.fail_saves.store(failing, Ordering::SeqCst);
        }

        /// Reads an order without going through the port
        pub async fn stored(&self, id: OrderId) -> Option<Order> {
            self.orders.read().await.get(&id).cloned()
        }
    }

    impl DomainPort for InMemoryOrderRepository {}

    #[async_trait]
    impl OrderRepository for InMemoryOrderRepository {
        async fn save(&self, mut order: Order) -> Result<Order, PortError> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(PortError::connection("repository unavailable"));
            }
            let id = match order.id() {
                Some(id) => id,
                None => {
                    let id = OrderId::new_v7();
                    order
                        .assign_id(id)
                        .map_err(|e| PortError::internal(e.to_string()))?;
                    id
                }
            };
            self.orders.write().await.insert(id, order.clone());
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(order)
        }

        async fn find_by_id(&self, id: OrderId) -> Result<Order, PortError> {
            self.orders
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Order", id))
        }

        async fn find_all_by_customer(&self, customer_id: &str) -> Result<Vec<Order>, PortError> {
            let orders = self.orders.read().await;
            let mut matching: Vec<Order> = orders
                .values()
                .filter(|order| order.customer_id() == customer_id)
                .cloned()
                .collect();
            matching.sort_by_key(|order| order.created_at());
            Ok(matching)
        }
    }

    /// In-memory mock implementation of IdempotencyCache
    #[derive(Debug, Default)]
    pub struct InMemoryIdempotencyCache {
        entries: Arc<RwLock<HashMap<String, String>>>,
    }

    impl InMemoryIdempotencyCache {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of entries currently held
        pub async fn len(&self) -> usize {
            self.entries.read().await.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.entries.read().await.is_empty()
        }
    }

    impl DomainPort for InMemoryIdempotencyCache {}

    #[async_trait]
    impl IdempotencyCache for InMemoryIdempotencyCache {
        async fn get(&self, key: &str) -> Result<Option<String>, PortError> {
            Ok(self.entries.read().await.get(key).cloned())
        }

        async fn put(&self, key: &str, value: &str) -> Result<(), PortError> {
            self.entries
                .write()
                .await
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn put_if_absent(&self, key: &str, value: &str) -> Result<bool, PortError> {
            let mut entries = self.entries.write().await;
            if entries.contains_key(key) {
                return Ok(false);
            }
            entries.insert(key.to_string(), value.to_string());
            Ok(true)
        }

        async fn delete(&self, key: &str) -> Result<bool, PortError> {
            Ok(self.entries.write().await.remove(key).is_some())
        }
    }

    /// Publisher that records every status it is asked to publish
    #[derive(Debug, Default)]
    pub struct RecordingEventPublisher {
        published: Arc<RwLock<Vec<(OrderId, OrderStatus)>>>,
        failing: AtomicBool,
    }

    impl RecordingEventPublisher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Everything published so far, in order
        pub async fn published(&self) -> Vec<(OrderId, OrderStatus)> {
            self.published.read().await.clone()
        }
    }

    impl DomainPort for RecordingEventPublisher {}

    #[async_trait]
    impl EventPublisher for RecordingEventPublisher {
        async fn publish_status(&self, order_id: OrderId, status: OrderStatus) -> Result<(), PortError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(PortError::ServiceUnavailable {
                    service: "event-bus".to_string(),
                });
            }
            self.published.write().await.push((order_id, status));
            Ok(())
        }
    }

    /// Classifier answering with a fixed classification
    #[derive(Debug)]
    pub struct StubRiskClassifier {
        classification: std::sync::RwLock<Classification>,
        calls: AtomicUsize,
        failing: AtomicBool,
    }

    impl StubRiskClassifier {
        pub fn new(classification: Classification) -> Self {
            Self {
                classification: std::sync::RwLock::new(classification),
                calls: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
            }
        }

        /// A classifier whose every call fails
        pub fn failing() -> Self {
            let classifier = Self::new(Classification::NoInformation);
            classifier.failing.store(true, Ordering::SeqCst);
            classifier
        }

        pub fn set_classification(&self, classification: Classification) {
            let mut guard = match self.classification.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *guard = classification;
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DomainPort for StubRiskClassifier {}

    #[async_trait]
    impl RiskClassifier for StubRiskClassifier {
        async fn classify(&self, order: &Order) -> Result<RiskClassification, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(PortError::Timeout {
                    operation: "classify".to_string(),
                    duration_ms: 10_000,
                });
            }
            let classification = match self.classification.read() {
                Ok(guard) => *guard,
                Err(poisoned) => *poisoned.into_inner(),
            };
            Ok(RiskClassification {
                order_id: order.id().map(|id| id.as_uuid().to_string()).unwrap_or_default(),
                customer_id: order.customer_id().to_string(),
                analyzed_at: Utc::now(),
                classification,
                occurrences: Vec::new(),
            })
        }
    }
}
