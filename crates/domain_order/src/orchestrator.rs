//! Workflow orchestration
//!
//! One operation per inbound signal. Each loads the order, consults the
//! transition table (and for submissions the underwriting policy), persists,
//! publishes the new status, and reports an [`Outcome`] from which exactly one
//! acknowledgment decision is derived.
//!
//! Asynchronous handlers never return an error. Every failure is logged and
//! turned into a withheld acknowledgment so the transport redelivers.

use std::sync::Arc;

use core_kernel::{Clock, OrderId};

use crate::error::OrderError;
use crate::idempotency::{IdempotencyGuard, RecordOutcome};
use crate::order::{Order, OrderStatus};
use crate::ports::{EventPublisher, IdempotencyCache, OrderRepository, RiskClassifier};
use crate::transitions::{Transition, Trigger};
use crate::underwriting;

/// Acknowledgment decision handed back to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    Acknowledge,
    Withhold,
}

/// Why a signal was acknowledged without any change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The order is not in the status the signal expects
    StaleStatus(OrderStatus),
    /// A payment arrived for an order that is not waiting for one
    PaymentNotApplicable(OrderStatus),
    /// The status tag on an order-submitted message names no handled step
    UnrecognizedStatusTag(String),
}

/// Why the acknowledgment was withheld
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithholdReason {
    /// Subscription arrived before the payment
    AwaitingPayment,
    /// A payment marker already exists for the order
    DuplicatePayment,
    /// A collaborator or the input failed
    Failed(String),
}

/// Result of handling one signal
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The signal was applied; holds the order as persisted
    Committed(Order),
    /// Stale or duplicate signal, nothing changed
    Skipped(SkipReason),
    /// Not ready or failed, nothing changed
    Withheld(WithholdReason),
}

impl Outcome {
    pub fn ack(&self) -> Ack {
        match self {
            Outcome::Committed(_) | Outcome::Skipped(_) => Ack::Acknowledge,
            Outcome::Withheld(_) => Ack::Withhold,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed(_))
    }
}

enum Advanced {
    Moved(Order),
    Unchanged(Order),
}

/// Orchestrates the order lifecycle across its collaborators
pub struct WorkflowOrchestrator {
    repository: Arc<dyn OrderRepository>,
    guard: IdempotencyGuard,
    publisher: Arc<dyn EventPublisher>,
    classifier: Arc<dyn RiskClassifier>,
    clock: Arc<dyn Clock>,
}

impl WorkflowOrchestrator {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        cache: Arc<dyn IdempotencyCache>,
        publisher: Arc<dyn EventPublisher>,
        classifier: Arc<dyn RiskClassifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            guard: IdempotencyGuard::new(cache),
            publisher,
            classifier,
            clock,
        }
    }

    /// Underwrites an order that has just been received
    pub async fn handle_submission(&self, order_id: OrderId) -> Outcome {
        match self.try_submission(order_id).await {
            Ok(outcome) => outcome,
            Err(error) => Self::failed("submission", order_id, error),
        }
    }

    /// Moves a validated order to pending
    pub async fn handle_validated(&self, order_id: OrderId) -> Outcome {
        match self.try_validated(order_id).await {
            Ok(outcome) => outcome,
            Err(error) => Self::failed("validated", order_id, error),
        }
    }

    /// Records a confirmed payment for a pending order
    pub async fn handle_payment(&self, order_id: OrderId, payment_id: &str) -> Outcome {
        match self.try_payment(order_id, payment_id).await {
            Ok(outcome) => outcome,
            Err(error) => Self::failed("payment", order_id, error),
        }
    }

    /// Approves a paid order once its subscription is active
    pub async fn handle_subscription_activated(
        &self,
        order_id: OrderId,
        subscription_id: &str,
    ) -> Outcome {
        match self.try_subscription(order_id, subscription_id).await {
            Ok(outcome) => outcome,
            Err(error) => Self::failed("subscription", order_id, error),
        }
    }

    /// Cancels an order on request
    ///
    /// Unlike the event handlers this surfaces errors to the caller. An order
    /// that is already cancelled is returned unchanged.
    pub async fn handle_cancel(&self, order_id: OrderId) -> Result<Order, OrderError> {
        let order = self.repository.find_by_id(order_id).await?;
        match self.advance(order_id, order, Trigger::CancelRequested).await? {
            Advanced::Moved(order) => {
                tracing::info!(order_id = %order_id, "Order cancelled");
                Ok(order)
            }
            Advanced::Unchanged(order) => {
                tracing::debug!(order_id = %order_id, "Order already cancelled");
                Ok(order)
            }
        }
    }

    async fn try_submission(&self, order_id: OrderId) -> Result<Outcome, OrderError> {
        let order = self.repository.find_by_id(order_id).await?;
        if order.status() != OrderStatus::Received {
            tracing::debug!(order_id = %order_id, status = %order.status(), "Submission already processed");
            return Ok(Outcome::Skipped(SkipReason::StaleStatus(order.status())));
        }

        let risk = self.classifier.classify(&order).await?;
        let limit = underwriting::limit_for(risk.classification, order.category());
        let decision = underwriting::evaluate(risk.classification, order.category(), order.insured_amount());

        tracing::info!(
            order_id = %order_id,
            classification = %risk.classification,
            category = %order.category(),
            insured_amount = %order.insured_amount(),
            limit = %limit.amount,
            inclusive = limit.inclusive,
            occurrences = risk.occurrences.len(),
            decision = ?decision,
            "Underwriting evaluated"
        );

        self.commit(order_id, order, decision.trigger()).await
    }

    async fn try_validated(&self, order_id: OrderId) -> Result<Outcome, OrderError> {
        let order = self.repository.find_by_id(order_id).await?;
        self.commit(order_id, order, Trigger::ValidatedEvent).await
    }

    async fn try_payment(&self, order_id: OrderId, payment_id: &str) -> Result<Outcome, OrderError> {
        if let Some(existing) = self.guard.payment_for(order_id).await? {
            tracing::warn!(order_id = %order_id, payment_id, existing = %existing, "Duplicate payment");
            return Ok(Outcome::Withheld(WithholdReason::DuplicatePayment));
        }

        let order = self.repository.find_by_id(order_id).await?;
        match order.status() {
            OrderStatus::Pending => {}
            status @ (OrderStatus::Received
            | OrderStatus::Validated
            | OrderStatus::Rejected
            | OrderStatus::Approved
            | OrderStatus::Cancelled) => {
                tracing::info!(order_id = %order_id, payment_id, status = %status, "Payment dropped for order not awaiting payment");
                return Ok(Outcome::Skipped(SkipReason::PaymentNotApplicable(status)));
            }
        }

        match self.guard.record_payment(order_id, payment_id).await? {
            RecordOutcome::Recorded => {
                tracing::info!(order_id = %order_id, payment_id, "Payment recorded");
                Ok(Outcome::Committed(order))
            }
            RecordOutcome::AlreadyRecorded(existing) => {
                tracing::warn!(order_id = %order_id, payment_id, existing = ?existing, "Payment recorded concurrently");
                Ok(Outcome::Withheld(WithholdReason::DuplicatePayment))
            }
        }
    }

    async fn try_subscription(
        &self,
        order_id: OrderId,
        subscription_id: &str,
    ) -> Result<Outcome, OrderError> {
        let Some(payment_id) = self.guard.payment_for(order_id).await? else {
            tracing::info!(order_id = %order_id, subscription_id, "Subscription before payment; awaiting redelivery");
            return Ok(Outcome::Withheld(WithholdReason::AwaitingPayment));
        };

        let order = self.repository.find_by_id(order_id).await?;
        if order.status() == OrderStatus::Approved {
            return self.finish_approval(order_id, payment_id).await;
        }

        let outcome = self.commit(order_id, order, Trigger::SubscriptionActivated).await?;
        if outcome.is_committed() {
            self.guard.consume(order_id).await?;
            tracing::info!(order_id = %order_id, subscription_id, payment_id = %payment_id, "Order approved");
        }
        Ok(outcome)
    }

    /// Completes an approval whose announcement or marker cleanup failed
    ///
    /// The order is already APPROVED but the marker survived, so the earlier
    /// delivery stopped after the save. APPROVED is announced again and the
    /// marker consumed.
    async fn finish_approval(&self, order_id: OrderId, payment_id: String) -> Result<Outcome, OrderError> {
        tracing::warn!(
            order_id = %order_id,
            payment_id = %payment_id,
            "Approved order still holds a payment marker; completing approval"
        );
        self.publisher
            .publish_status(order_id, OrderStatus::Approved)
            .await?;
        self.guard.consume(order_id).await?;
        Ok(Outcome::Skipped(SkipReason::StaleStatus(OrderStatus::Approved)))
    }

    async fn commit(
        &self,
        order_id: OrderId,
        order: Order,
        trigger: Trigger,
    ) -> Result<Outcome, OrderError> {
        match self.advance(order_id, order, trigger).await? {
            Advanced::Moved(order) => Ok(Outcome::Committed(order)),
            Advanced::Unchanged(order) => {
                tracing::debug!(order_id = %order_id, status = %order.status(), trigger = %trigger, "Stale signal");
                Ok(Outcome::Skipped(SkipReason::StaleStatus(order.status())))
            }
        }
    }

    /// Applies the trigger and, if the status moved, persists and publishes
    async fn advance(
        &self,
        order_id: OrderId,
        mut order: Order,
        trigger: Trigger,
    ) -> Result<Advanced, OrderError> {
        match order.apply(trigger, self.clock.now())? {
            Transition::Move(status) => {
                let saved = self.repository.save(order).await?;
                self.publisher.publish_status(order_id, status).await?;
                tracing::info!(order_id = %order_id, status = %status, "Order status changed");
                Ok(Advanced::Moved(saved))
            }
            Transition::Stale => Ok(Advanced::Unchanged(order)),
            Transition::Illegal => Err(OrderError::InvalidStateTransition {
                from: order.status().to_string(),
                trigger: trigger.to_string(),
            }),
        }
    }

    fn failed(operation: &'static str, order_id: OrderId, error: OrderError) -> Outcome {
        tracing::error!(
            order_id = %order_id,
            operation,
            error = %error,
            "Event handling failed; acknowledgment withheld"
        );
        Outcome::Withheld(WithholdReason::Failed(error.to_string()))
    }
}

impl std::fmt::Debug for WorkflowOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowOrchestrator").finish_non_exhaustive()
    }
}
