//! In-process event bus
//!
//! Carries status changes published by the order workflow back into the
//! [`EventRouter`], together with payment and subscription signals submitted
//! from outside (see `POST /events/:topic`). A message whose acknowledgment
//! is withheld is delivered again after a fixed delay until the redelivery
//! budget runs out; after that it is logged as a dead letter and dropped.
//!
//! Two queues feed the consumer. External submissions go through a bounded
//! channel and wait for capacity. Status changes and redeliveries go through
//! an unbounded follow-up queue, because the consumer itself publishes them
//! while handling a message and must never wait on the queue it drains.
//! Follow-ups are handled first.
//!
//! Nothing is persisted: messages still queued or waiting for redelivery
//! when the process stops are lost.

use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

use core_kernel::{DomainPort, OrderId, PortError};
use domain_order::events::{OrderStatusPayload, ORDERS_TOPIC, ORDER_STATUS_HEADER};
use domain_order::{Ack, EventPublisher, EventRouter, InboundMessage, OrderStatus};

/// Event bus errors
#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("Event bus is closed")]
    Closed,

    #[error("Failed to encode payload: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<MessagingError> for PortError {
    fn from(err: MessagingError) -> Self {
        match err {
            MessagingError::Closed => PortError::ServiceUnavailable {
                service: "event-bus".to_string(),
            },
            MessagingError::Encoding(e) => PortError::transformation(e.to_string()),
        }
    }
}

/// Redelivery policy and channel sizing
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    pub redelivery_delay: Duration,
    pub max_redeliveries: u32,
    /// Capacity of the external submission channel
    pub channel_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            redelivery_delay: Duration::from_secs(1),
            max_redeliveries: 5,
            channel_capacity: 1_024,
        }
    }
}

#[derive(Debug)]
struct Delivery {
    message: InboundMessage,
    attempt: u32,
}

/// Publishing half of the bus
#[derive(Debug, Clone)]
pub struct InMemoryEventBus {
    inbound: mpsc::Sender<Delivery>,
    follow_ups: mpsc::UnboundedSender<Delivery>,
}

impl InMemoryEventBus {
    /// Creates the bus and the consumer that drains it
    pub fn new(config: EventBusConfig) -> (Self, EventConsumer) {
        let (inbound, inbound_rx) = mpsc::channel(config.channel_capacity.max(1));
        let (follow_ups, follow_ups_rx) = mpsc::unbounded_channel();
        let consumer = EventConsumer {
            inbound: inbound_rx,
            follow_ups: follow_ups_rx,
            redeliver: follow_ups.downgrade(),
            pending_redeliveries: Arc::new(AtomicUsize::new(0)),
            config,
        };
        (Self { inbound, follow_ups }, consumer)
    }

    /// Submits a message from any source topic, waiting for channel capacity
    pub async fn submit(&self, message: InboundMessage) -> Result<(), MessagingError> {
        self.inbound
            .send(Delivery { message, attempt: 0 })
            .await
            .map_err(|_| MessagingError::Closed)
    }

    fn status_message(order_id: OrderId, status: OrderStatus) -> Result<InboundMessage, MessagingError> {
        let payload = serde_json::to_vec(&OrderStatusPayload {
            id: order_id.as_uuid().to_string(),
        })?;
        Ok(InboundMessage::new(ORDERS_TOPIC, payload).with_header(ORDER_STATUS_HEADER, status.as_str()))
    }
}

impl DomainPort for InMemoryEventBus {}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish_status(&self, order_id: OrderId, status: OrderStatus) -> Result<(), PortError> {
        let message = Self::status_message(order_id, status)?;
        self.follow_ups
            .send(Delivery { message, attempt: 0 })
            .map_err(|_| MessagingError::Closed)?;
        tracing::debug!(order_id = %order_id, status = %status, topic = ORDERS_TOPIC, "Status change published");
        Ok(())
    }
}

/// What the consumer did before it stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerReport {
    /// Messages routed, redeliveries included
    pub handled: usize,
    pub dead_lettered: usize,
    /// Messages withheld while draining plus redeliveries still waiting
    pub abandoned: usize,
}

/// Consuming half of the bus
pub struct EventConsumer {
    inbound: mpsc::Receiver<Delivery>,
    follow_ups: mpsc::UnboundedReceiver<Delivery>,
    redeliver: mpsc::WeakUnboundedSender<Delivery>,
    pending_redeliveries: Arc<AtomicUsize>,
    config: EventBusConfig,
}

impl EventConsumer {
    /// Routes messages until every [`InMemoryEventBus`] handle is dropped
    pub async fn run(self, router: EventRouter) -> ConsumerReport {
        self.run_until(router, std::future::pending()).await
    }

    /// Routes messages until `shutdown` resolves, then drains what is queued
    ///
    /// Messages are handled one at a time; a handler in progress always runs
    /// to completion. While draining, external submissions are refused and
    /// withheld messages are not scheduled again.
    pub async fn run_until<F>(mut self, router: EventRouter, shutdown: F) -> ConsumerReport
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            max_redeliveries = self.config.max_redeliveries,
            redelivery_delay_ms = self.config.redelivery_delay.as_millis() as u64,
            "Event consumer started"
        );

        let mut report = ConsumerReport::default();
        tokio::pin!(shutdown);

        loop {
            let delivery = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                delivery = self.next_delivery() => delivery,
            };
            let Some(delivery) = delivery else {
                tracing::info!("All bus handles dropped");
                break;
            };

            report.handled += 1;
            if router.route(&delivery.message).await == Ack::Withhold
                && !self.schedule_redelivery(delivery)
            {
                report.dead_lettered += 1;
            }
        }

        self.drain(&router, &mut report).await;
        report.abandoned += self.pending_redeliveries.load(Ordering::SeqCst);

        tracing::info!(
            handled = report.handled,
            dead_lettered = report.dead_lettered,
            abandoned = report.abandoned,
            "Event consumer stopped"
        );
        report
    }

    async fn next_delivery(&mut self) -> Option<Delivery> {
        tokio::select! {
            biased;
            Some(delivery) = self.follow_ups.recv() => Some(delivery),
            Some(delivery) = self.inbound.recv() => Some(delivery),
            else => None,
        }
    }

    async fn drain(&mut self, router: &EventRouter, report: &mut ConsumerReport) {
        self.inbound.close();
        loop {
            let delivery = match self.follow_ups.try_recv() {
                Ok(delivery) => delivery,
                Err(_) => match self.inbound.try_recv() {
                    Ok(delivery) => delivery,
                    Err(_) => break,
                },
            };

            report.handled += 1;
            if router.route(&delivery.message).await == Ack::Withhold {
                tracing::warn!(
                    topic = %delivery.message.topic,
                    attempt = delivery.attempt,
                    payload = %String::from_utf8_lossy(&delivery.message.payload),
                    "Withheld during shutdown; message dropped"
                );
                report.abandoned += 1;
            }
        }
    }

    /// Schedules another attempt; returns false once the budget is spent
    fn schedule_redelivery(&self, delivery: Delivery) -> bool {
        if delivery.attempt >= self.config.max_redeliveries {
            tracing::error!(
                topic = %delivery.message.topic,
                attempts = delivery.attempt + 1,
                payload = %String::from_utf8_lossy(&delivery.message.payload),
                "Redelivery budget exhausted; message dead-lettered"
            );
            return false;
        }

        let Some(sender) = self.redeliver.upgrade() else {
            tracing::warn!(topic = %delivery.message.topic, "Bus closed; withheld message dropped");
            return true;
        };
        let delay = self.config.redelivery_delay;
        let pending = self.pending_redeliveries.clone();
        let next = Delivery {
            message: delivery.message,
            attempt: delivery.attempt + 1,
        };

        pending.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            pending.fetch_sub(1, Ordering::SeqCst);
            tracing::debug!(topic = %next.message.topic, attempt = next.attempt, "Redelivering message");
            if sender.send(next).is_err() {
                tracing::warn!("Bus closed before redelivery");
            }
        });
        true
    }
}

impl std::fmt::Debug for EventConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventConsumer")
            .field("config", &self.config)
            .field("pending_redeliveries", &self.pending_redeliveries.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
