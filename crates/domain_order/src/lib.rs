//! Order Lifecycle Domain
//!
//! This crate implements the lifecycle of an insurance order as it moves
//! through underwriting, payment, and subscription activation, following
//! Domain-Driven Design and Hexagonal Architecture principles.
//!
//! # Architecture
//!
//! - **Aggregate**: [`Order`] guards its status and history
//! - **Pure rules**: the transition table and the underwriting limits
//! - **Orchestration**: one operation per inbound signal, each deciding
//!   whether the transport may acknowledge
//! - **Ports**: repository, idempotency cache, event publisher, risk classifier
//!
//! # Order Lifecycle
//!
//! ```text
//! RECEIVED -> VALIDATED -> PENDING -> APPROVED
//!         \-> REJECTED
//! RECEIVED | VALIDATED | PENDING -> CANCELLED
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_order::{EventRouter, InboundMessage, WorkflowOrchestrator};
//!
//! let orchestrator = Arc::new(WorkflowOrchestrator::new(
//!     repository, cache, publisher, classifier, clock,
//! ));
//! let router = EventRouter::new(orchestrator);
//!
//! let ack = router.route(&message).await;
//! ```

pub mod adapters;
pub mod error;
pub mod events;
pub mod idempotency;
pub mod orchestrator;
pub mod order;
pub mod ports;
pub mod risk;
pub mod router;
pub mod services;
pub mod transitions;
pub mod underwriting;

pub use error::OrderError;
pub use events::EventSource;
pub use idempotency::{IdempotencyGuard, RecordOutcome};
pub use orchestrator::{Ack, Outcome, SkipReason, WithholdReason, WorkflowOrchestrator};
pub use order::{Category, HistoryEntry, NewOrder, Order, OrderStatus, COVERAGE_TERM_DAYS};
pub use ports::{EventPublisher, IdempotencyCache, OrderRepository, RiskClassifier};
pub use risk::{Classification, Occurrence, RiskClassification};
pub use router::{DecodeError, EventRouter, InboundEvent, InboundMessage};
pub use services::OrderService;
pub use transitions::{Transition, Trigger};
pub use underwriting::{UnderwritingDecision, UnderwritingLimit};
