//! Order lifecycle events
//!
//! Wire contracts for the three inbound sources and the single outbound
//! status channel. Payloads are JSON with snake_case keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Topic carrying order status changes; the service also consumes it
pub const ORDERS_TOPIC: &str = "orders-topic";
/// Topic carrying confirmed payments
pub const PAYMENTS_TOPIC: &str = "payments-topic";
/// Topic carrying activated insurance subscriptions
pub const SUBSCRIPTIONS_TOPIC: &str = "insurance-subscriptions-topic";
/// Header naming the status an order-submitted message refers to
pub const ORDER_STATUS_HEADER: &str = "orderStatus";
/// Tag used when the status header is missing
pub const UNKNOWN_STATUS_TAG: &str = "UNKNOWN";

/// Inbound event source identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    OrderSubmitted,
    PaymentConfirmed,
    SubscriptionActivated,
}

impl EventSource {
    /// Resolves a topic name to its source
    pub fn from_topic(topic: &str) -> Option<Self> {
        match topic {
            ORDERS_TOPIC => Some(EventSource::OrderSubmitted),
            PAYMENTS_TOPIC => Some(EventSource::PaymentConfirmed),
            SUBSCRIPTIONS_TOPIC => Some(EventSource::SubscriptionActivated),
            _ => None,
        }
    }

    pub fn topic(&self) -> &'static str {
        match self {
            EventSource::OrderSubmitted => ORDERS_TOPIC,
            EventSource::PaymentConfirmed => PAYMENTS_TOPIC,
            EventSource::SubscriptionActivated => SUBSCRIPTIONS_TOPIC,
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.topic())
    }
}

/// Payload published on the orders topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusPayload {
    pub id: String,
}

/// Payload received on the payments topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmedPayload {
    /// Payment identifier
    pub id: String,
    pub order_id: String,
}

/// Payload received on the subscriptions topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionActivatedPayload {
    /// Subscription identifier
    pub id: String,
    pub order_id: String,
}
