//! In-memory wiring of the order lifecycle
//!
//! Builds the orchestrator, router and order service over the mock ports
//! with a fixed clock, and keeps handles to every mock so tests can inspect
//! what happened.

use std::sync::Arc;

use core_kernel::{Clock, FixedClock, OrderId};
use domain_order::ports::mock::{
    InMemoryIdempotencyCache, InMemoryOrderRepository, RecordingEventPublisher,
    StubRiskClassifier,
};
use domain_order::{
    Classification, EventRouter, IdempotencyCache, Order, OrderRepository, OrderService,
    WorkflowOrchestrator,
};

use crate::fixtures::TimeFixtures;

/// Lifecycle components wired to in-memory collaborators
pub struct TestHarness {
    pub repository: Arc<InMemoryOrderRepository>,
    pub cache: Arc<InMemoryIdempotencyCache>,
    pub publisher: Arc<RecordingEventPublisher>,
    pub classifier: Arc<StubRiskClassifier>,
    pub clock: Arc<FixedClock>,
    pub orchestrator: Arc<WorkflowOrchestrator>,
    pub router: EventRouter,
    pub service: OrderService,
}

impl TestHarness {
    /// Harness whose classifier answers `classification`
    pub fn new(classification: Classification) -> Self {
        Self::with_classifier(StubRiskClassifier::new(classification))
    }

    pub fn with_classifier(classifier: StubRiskClassifier) -> Self {
        let repository = Arc::new(InMemoryOrderRepository::new());
        let cache = Arc::new(InMemoryIdempotencyCache::new());
        let publisher = Arc::new(RecordingEventPublisher::new());
        let classifier = Arc::new(classifier);
        let clock = Arc::new(FixedClock::new(TimeFixtures::processing_time()));

        let orchestrator = Arc::new(WorkflowOrchestrator::new(
            repository.clone(),
            cache.clone(),
            publisher.clone(),
            classifier.clone(),
            clock.clone(),
        ));
        let router = EventRouter::new(orchestrator.clone());
        let service = OrderService::new(
            repository.clone(),
            publisher.clone(),
            orchestrator.clone(),
            clock.clone() as Arc<dyn Clock>,
        );

        Self {
            repository,
            cache,
            publisher,
            classifier,
            clock,
            orchestrator,
            router,
            service,
        }
    }

    /// Stores an order and returns its id
    ///
    /// # Panics
    ///
    /// Panics if the in-memory save fails
    pub async fn seed(&self, order: Order) -> OrderId {
        self.repository
            .save(order)
            .await
            .expect("in-memory save")
            .id()
            .expect("saved order has id")
    }

    /// Current stored state of an order
    ///
    /// # Panics
    ///
    /// Panics if the order is not stored
    pub async fn stored(&self, id: OrderId) -> Order {
        self.repository.stored(id).await.expect("order is stored")
    }

    /// Records a payment marker directly in the cache
    pub async fn mark_paid(&self, id: OrderId, payment_id: &str) {
        self.cache
            .put(&id.as_uuid().to_string(), payment_id)
            .await
            .expect("in-memory put");
    }

    /// Payment id currently recorded for the order
    pub async fn marker(&self, id: OrderId) -> Option<String> {
        self.cache
            .get(&id.as_uuid().to_string())
            .await
            .expect("in-memory get")
    }
}
