//! Inbound event routing
//!
//! Maps a raw message (topic, headers, JSON payload) to the orchestrator
//! operation that handles it and returns the acknowledgment decision.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use core_kernel::{CoreError, OrderId};

use crate::events::{
    EventSource, OrderStatusPayload, PaymentConfirmedPayload, SubscriptionActivatedPayload,
    ORDER_STATUS_HEADER, UNKNOWN_STATUS_TAG,
};
use crate::order::OrderStatus;
use crate::orchestrator::{Ack, Outcome, SkipReason, WorkflowOrchestrator};

/// A message as delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub headers: HashMap<String, String>,
    pub payload: Vec<u8>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            headers: HashMap::new(),
            payload: payload.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// A decoded inbound signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    OrderSubmitted {
        order_id: OrderId,
        status_tag: String,
    },
    PaymentConfirmed {
        order_id: OrderId,
        payment_id: String,
    },
    SubscriptionActivated {
        order_id: OrderId,
        subscription_id: String,
    },
}

/// Reasons a message could not be turned into an [`InboundEvent`]
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("No handler for topic {0}")]
    UnknownTopic(String),

    #[error("Malformed {source_topic} payload: {error}")]
    Payload {
        source_topic: EventSource,
        #[source]
        error: serde_json::Error,
    },

    #[error("Invalid order id: {0}")]
    OrderId(#[from] CoreError),
}

/// Decodes a raw message
pub fn decode(message: &InboundMessage) -> Result<InboundEvent, DecodeError> {
    let source = EventSource::from_topic(&message.topic)
        .ok_or_else(|| DecodeError::UnknownTopic(message.topic.clone()))?;
    let payload_error = |error: serde_json::Error| DecodeError::Payload {
        source_topic: source,
        error,
    };

    match source {
        EventSource::OrderSubmitted => {
            let payload: OrderStatusPayload =
                serde_json::from_slice(&message.payload).map_err(payload_error)?;
            let status_tag = message
                .headers
                .get(ORDER_STATUS_HEADER)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_STATUS_TAG.to_string());
            Ok(InboundEvent::OrderSubmitted {
                order_id: payload.id.parse()?,
                status_tag,
            })
        }
        EventSource::PaymentConfirmed => {
            let payload: PaymentConfirmedPayload =
                serde_json::from_slice(&message.payload).map_err(payload_error)?;
            Ok(InboundEvent::PaymentConfirmed {
                order_id: payload.order_id.parse()?,
                payment_id: payload.id,
            })
        }
        EventSource::SubscriptionActivated => {
            let payload: SubscriptionActivatedPayload =
                serde_json::from_slice(&message.payload).map_err(payload_error)?;
            Ok(InboundEvent::SubscriptionActivated {
                order_id: payload.order_id.parse()?,
                subscription_id: payload.id,
            })
        }
    }
}

/// Routes inbound signals to the orchestrator
#[derive(Debug, Clone)]
pub struct EventRouter {
    orchestrator: Arc<WorkflowOrchestrator>,
}

impl EventRouter {
    pub fn new(orchestrator: Arc<WorkflowOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Decodes and dispatches a raw message
    pub async fn route(&self, message: &InboundMessage) -> Ack {
        match decode(message) {
            Ok(event) => self.dispatch(event).await.ack(),
            Err(DecodeError::UnknownTopic(topic)) => {
                tracing::warn!(topic = %topic, "Message on unknown topic; acknowledgment withheld");
                Ack::Withhold
            }
            Err(error) => {
                tracing::error!(topic = %message.topic, error = %error, "Undecodable message; acknowledgment withheld");
                Ack::Withhold
            }
        }
    }

    /// Dispatches a decoded event to its handler
    pub async fn dispatch(&self, event: InboundEvent) -> Outcome {
        match event {
            InboundEvent::OrderSubmitted { order_id, status_tag } => {
                let status = match status_tag.parse::<OrderStatus>() {
                    Ok(status) => status,
                    Err(_) => return Self::unrecognized(order_id, status_tag),
                };
                match status {
                    OrderStatus::Received => self.orchestrator.handle_submission(order_id).await,
                    OrderStatus::Validated => self.orchestrator.handle_validated(order_id).await,
                    OrderStatus::Pending
                    | OrderStatus::Rejected
                    | OrderStatus::Approved
                    | OrderStatus::Cancelled => Self::unrecognized(order_id, status_tag),
                }
            }
            InboundEvent::PaymentConfirmed { order_id, payment_id } => {
                self.orchestrator.handle_payment(order_id, &payment_id).await
            }
            InboundEvent::SubscriptionActivated {
                order_id,
                subscription_id,
            } => {
                self.orchestrator
                    .handle_subscription_activated(order_id, &subscription_id)
                    .await
            }
        }
    }

    fn unrecognized(order_id: OrderId, status_tag: String) -> Outcome {
        tracing::debug!(order_id = %order_id, status_tag = %status_tag, "No handler for status tag");
        Outcome::Skipped(SkipReason::UnrecognizedStatusTag(status_tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ORDERS_TOPIC, PAYMENTS_TOPIC, SUBSCRIPTIONS_TOPIC};

    const ORDER_UUID: &str = "0190a3d2-7c1e-7b3a-9c55-1f2e3d4c5b6a";

    #[test]
    fn test_decode_order_submitted_with_header() {
        let message = InboundMessage::new(ORDERS_TOPIC, format!(r#"{{"id":"{}"}}"#, ORDER_UUID))
            .with_header(ORDER_STATUS_HEADER, "VALIDATED");

        match decode(&message).unwrap() {
            InboundEvent::OrderSubmitted { order_id, status_tag } => {
                assert_eq!(order_id.as_uuid().to_string(), ORDER_UUID);
                assert_eq!(status_tag, "VALIDATED");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_missing_header_is_unknown() {
        let message = InboundMessage::new(ORDERS_TOPIC, format!(r#"{{"id":"{}"}}"#, ORDER_UUID));
        assert!(matches!(
            decode(&message).unwrap(),
            InboundEvent::OrderSubmitted { status_tag, .. } if status_tag == UNKNOWN_STATUS_TAG
        ));
    }

    #[test]
    fn test_decode_payment_and_subscription() {
        let body = format!(r#"{{"id":"PAY-9","order_id":"ORD-{}"}}"#, ORDER_UUID);
        assert!(matches!(
            decode(&InboundMessage::new(PAYMENTS_TOPIC, body.clone())).unwrap(),
            InboundEvent::PaymentConfirmed { payment_id, .. } if payment_id == "PAY-9"
        ));
        assert!(matches!(
            decode(&InboundMessage::new(SUBSCRIPTIONS_TOPIC, body)).unwrap(),
            InboundEvent::SubscriptionActivated { subscription_id, .. } if subscription_id == "PAY-9"
        ));
    }

    #[test]
    fn test_decode_failures() {
        assert!(matches!(
            decode(&InboundMessage::new("claims-topic", "{}")),
            Err(DecodeError::UnknownTopic(_))
        ));
        assert!(matches!(
            decode(&InboundMessage::new(PAYMENTS_TOPIC, "not json")),
            Err(DecodeError::Payload { .. })
        ));
        assert!(matches!(
            decode(&InboundMessage::new(ORDERS_TOPIC, r#"{"id":"nope"}"#)),
            Err(DecodeError::OrderId(_))
        ));
    }
}
