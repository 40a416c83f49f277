//! Pre-built Test Fixtures
//!
//! Consistent, predictable data for order tests.

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;

use core_kernel::OrderId;
use domain_order::events::{
    ORDERS_TOPIC, ORDER_STATUS_HEADER, PAYMENTS_TOPIC, SUBSCRIPTIONS_TOPIC,
};
use domain_order::{InboundMessage, OrderStatus};

static PROCESSING_TIME: Lazy<DateTime<Utc>> =
    Lazy::new(|| Utc.with_ymd_and_hms(2024, 5, 10, 14, 30, 0).unwrap());

/// Fixture for timestamps
pub struct TimeFixtures;

impl TimeFixtures {
    /// The instant test clocks start at
    pub fn processing_time() -> DateTime<Utc> {
        *PROCESSING_TIME
    }
}

/// Fixture for opaque identifiers carried on orders
pub struct StringFixtures;

impl StringFixtures {
    pub fn customer_id() -> &'static str {
        "7c2a27ba-71ef-4dd8-a3cf-5e094316ffd8"
    }

    pub fn product_id() -> &'static str {
        "1b2da7cc-b367-4196-8a78-9cfeec21f587"
    }

    pub fn payment_id() -> &'static str {
        "PAY-0001"
    }

    pub fn subscription_id() -> &'static str {
        "SUB-0001"
    }
}

/// Fixture for raw inbound messages as the transport delivers them
pub struct MessageFixtures;

impl MessageFixtures {
    /// Message on the orders topic tagged with `status`
    pub fn order_status(order_id: OrderId, status: &str) -> InboundMessage {
        InboundMessage::new(ORDERS_TOPIC, order_body(order_id))
            .with_header(ORDER_STATUS_HEADER, status)
    }

    pub fn order_received(order_id: OrderId) -> InboundMessage {
        Self::order_status(order_id, OrderStatus::Received.as_str())
    }

    pub fn order_validated(order_id: OrderId) -> InboundMessage {
        Self::order_status(order_id, OrderStatus::Validated.as_str())
    }

    /// Orders topic message without the status header
    pub fn order_untagged(order_id: OrderId) -> InboundMessage {
        InboundMessage::new(ORDERS_TOPIC, order_body(order_id))
    }

    pub fn payment(order_id: OrderId, payment_id: &str) -> InboundMessage {
        InboundMessage::new(PAYMENTS_TOPIC, linked_body(payment_id, order_id))
    }

    pub fn subscription(order_id: OrderId, subscription_id: &str) -> InboundMessage {
        InboundMessage::new(SUBSCRIPTIONS_TOPIC, linked_body(subscription_id, order_id))
    }
}

fn order_body(order_id: OrderId) -> Vec<u8> {
    serde_json::json!({ "id": order_id.as_uuid().to_string() })
        .to_string()
        .into_bytes()
}

fn linked_body(id: &str, order_id: OrderId) -> Vec<u8> {
    serde_json::json!({ "id": id, "order_id": order_id.as_uuid().to_string() })
        .to_string()
        .into_bytes()
}
