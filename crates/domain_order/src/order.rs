//! Order Aggregate Root
//!
//! The Order aggregate is the consistency boundary for the lifecycle. Its
//! fields are private; the only way to change status is [`Order::apply`],
//! which consults the transition table and appends to the history in the
//! same step.
//!
//! # Invariants
//!
//! - `history` is never empty and its last entry carries the current status
//! - History entries are only ever appended
//! - The id is assigned once, by the repository on first save
//! - `finished_at` is set exactly once, when the order is approved

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use core_kernel::OrderId;

use crate::error::OrderError;
use crate::transitions::{self, Transition, Trigger};

/// Days of coverage granted on approval
pub const COVERAGE_TERM_DAYS: i64 = 365;

/// Order lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Created and waiting for underwriting
    Received,
    /// Underwriting passed
    Validated,
    /// Waiting for payment and subscription activation
    Pending,
    /// Underwriting failed (terminal)
    Rejected,
    /// Paid and subscribed (terminal)
    Approved,
    /// Cancelled on request (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Received,
        OrderStatus::Validated,
        OrderStatus::Pending,
        OrderStatus::Rejected,
        OrderStatus::Approved,
        OrderStatus::Cancelled,
    ];

    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "RECEIVED",
            OrderStatus::Validated => "VALIDATED",
            OrderStatus::Pending => "PENDING",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::Approved => "APPROVED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Returns true if no further transition can leave this status
    pub fn is_terminal(&self) -> bool {
        match self {
            OrderStatus::Rejected | OrderStatus::Approved | OrderStatus::Cancelled => true,
            OrderStatus::Received | OrderStatus::Validated | OrderStatus::Pending => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| OrderError::validation(format!("Unknown order status: {}", s)))
    }
}

/// Insurance product category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Life,
    Auto,
    Residential,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Life,
        Category::Auto,
        Category::Residential,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Life => "LIFE",
            Category::Auto => "AUTO",
            Category::Residential => "RESIDENTIAL",
            Category::Other => "OTHER",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == upper)
            .ok_or_else(|| OrderError::validation(format!("Unknown category: {}", s)))
    }
}

/// One step in the order's status history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}

/// Input for creating an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: String,
    pub product_id: String,
    pub category: Category,
    pub sales_channel: String,
    pub payment_method: String,
    pub total_monthly_premium_amount: Decimal,
    pub insured_amount: Decimal,
    #[serde(default)]
    pub coverages: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub assistances: BTreeSet<String>,
}

/// The Order aggregate root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OrderRecord")]
pub struct Order {
    id: Option<OrderId>,
    customer_id: String,
    product_id: String,
    category: Category,
    sales_channel: String,
    payment_method: String,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    total_monthly_premium_amount: Decimal,
    insured_amount: Decimal,
    coverages: BTreeMap<String, Decimal>,
    assistances: BTreeSet<String>,
    history: Vec<HistoryEntry>,
}

impl Order {
    /// Creates a new order in RECEIVED with a single history entry
    pub fn receive(new_order: NewOrder, at: DateTime<Utc>) -> Result<Self, OrderError> {
        if new_order.customer_id.trim().is_empty() {
            return Err(OrderError::validation("customer_id must not be blank"));
        }
        if new_order.product_id.trim().is_empty() {
            return Err(OrderError::validation("product_id must not be blank"));
        }
        if new_order.insured_amount.is_sign_negative() {
            return Err(OrderError::validation("insured_amount must not be negative"));
        }
        if new_order.total_monthly_premium_amount.is_sign_negative() {
            return Err(OrderError::validation(
                "total_monthly_premium_amount must not be negative",
            ));
        }
        if let Some((name, _)) = new_order
            .coverages
            .iter()
            .find(|(_, amount)| amount.is_sign_negative())
        {
            return Err(OrderError::validation(format!(
                "coverage {} must not be negative",
                name
            )));
        }

        Ok(Self {
            id: None,
            customer_id: new_order.customer_id,
            product_id: new_order.product_id,
            category: new_order.category,
            sales_channel: new_order.sales_channel,
            payment_method: new_order.payment_method,
            status: OrderStatus::Received,
            created_at: at,
            finished_at: None,
            total_monthly_premium_amount: new_order.total_monthly_premium_amount,
            insured_amount: new_order.insured_amount,
            coverages: new_order.coverages,
            assistances: new_order.assistances,
            history: vec![HistoryEntry {
                status: OrderStatus::Received,
                timestamp: at,
            }],
        })
    }

    /// Applies a trigger at the given processing time
    ///
    /// A legal move updates the status and appends a history entry. A stale
    /// signal leaves the order untouched. A move the table forbids is an
    /// error and also leaves the order untouched.
    pub fn apply(&mut self, trigger: Trigger, at: DateTime<Utc>) -> Result<Transition, OrderError> {
        let transition = transitions::next(self.status, trigger);
        match transition {
            Transition::Move(next) => {
                self.status = next;
                self.history.push(HistoryEntry {
                    status: next,
                    timestamp: at,
                });
                if next == OrderStatus::Approved && self.finished_at.is_none() {
                    self.finished_at = Some(at + Duration::days(COVERAGE_TERM_DAYS));
                }
                Ok(transition)
            }
            Transition::Stale => Ok(transition),
            Transition::Illegal => Err(OrderError::InvalidStateTransition {
                from: self.status.to_string(),
                trigger: trigger.to_string(),
            }),
        }
    }

    /// Assigns the identifier; a second assignment is rejected
    pub fn assign_id(&mut self, id: OrderId) -> Result<(), OrderError> {
        match self.id {
            Some(existing) => Err(OrderError::IdAlreadyAssigned(existing.to_string())),
            None => {
                self.id = Some(id);
                Ok(())
            }
        }
    }

    // Accessors

    pub fn id(&self) -> Option<OrderId> {
        self.id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn sales_channel(&self) -> &str {
        &self.sales_channel
    }

    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn total_monthly_premium_amount(&self) -> Decimal {
        self.total_monthly_premium_amount
    }

    pub fn insured_amount(&self) -> Decimal {
        self.insured_amount
    }

    pub fn coverages(&self) -> &BTreeMap<String, Decimal> {
        &self.coverages
    }

    pub fn assistances(&self) -> &BTreeSet<String> {
        &self.assistances
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }
}

/// Unchecked order shape as stored in a document or received on the wire
///
/// Converting into [`Order`] re-checks the history invariant, so a stored
/// document that violates it is refused at load time.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRecord {
    pub id: Option<OrderId>,
    pub customer_id: String,
    pub product_id: String,
    pub category: Category,
    pub sales_channel: String,
    pub payment_method: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub total_monthly_premium_amount: Decimal,
    pub insured_amount: Decimal,
    #[serde(default)]
    pub coverages: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub assistances: BTreeSet<String>,
    pub history: Vec<HistoryEntry>,
}

impl TryFrom<OrderRecord> for Order {
    type Error = OrderError;

    fn try_from(record: OrderRecord) -> Result<Self, Self::Error> {
        match record.history.last() {
            None => return Err(OrderError::validation("order history is empty")),
            Some(last) if last.status != record.status => {
                return Err(OrderError::validation(format!(
                    "order status {} does not match last history entry {}",
                    record.status, last.status
                )));
            }
            Some(_) => {}
        }

        Ok(Self {
            id: record.id,
            customer_id: record.customer_id,
            product_id: record.product_id,
            category: record.category,
            sales_channel: record.sales_channel,
            payment_method: record.payment_method,
            status: record.status,
            created_at: record.created_at,
            finished_at: record.finished_at,
            total_monthly_premium_amount: record.total_monthly_premium_amount,
            insured_amount: record.insured_amount,
            coverages: record.coverages,
            assistances: record.assistances,
            history: record.history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn new_order() -> NewOrder {
        NewOrder {
            customer_id: "CUST-1".to_string(),
            product_id: "PROD-1".to_string(),
            category: Category::Auto,
            sales_channel: "MOBILE".to_string(),
            payment_method: "CREDIT_CARD".to_string(),
            total_monthly_premium_amount: dec!(75.25),
            insured_amount: dec!(275000.50),
            coverages: BTreeMap::from([("Glass".to_string(), dec!(5000))]),
            assistances: BTreeSet::from(["Towing".to_string()]),
        }
    }

    #[test]
    fn test_receive_starts_in_received() {
        let order = Order::receive(new_order(), at()).unwrap();
        assert_eq!(order.status(), OrderStatus::Received);
        assert_eq!(order.history().len(), 1);
        assert_eq!(order.history()[0].timestamp, at());
        assert!(order.id().is_none());
        assert!(order.finished_at().is_none());
    }

    #[test]
    fn test_receive_rejects_blank_customer() {
        let mut input = new_order();
        input.customer_id = "  ".to_string();
        assert!(matches!(Order::receive(input, at()), Err(OrderError::Validation(_))));
    }

    #[test]
    fn test_receive_rejects_negative_amount() {
        let mut input = new_order();
        input.insured_amount = dec!(-1);
        assert!(Order::receive(input, at()).is_err());
    }

    #[test]
    fn test_apply_move_appends_history() {
        let mut order = Order::receive(new_order(), at()).unwrap();
        let later = at() + Duration::minutes(5);
        let transition = order.apply(Trigger::UnderwritingPassed, later).unwrap();

        assert_eq!(transition, Transition::Move(OrderStatus::Validated));
        assert_eq!(order.status(), OrderStatus::Validated);
        assert_eq!(order.history().len(), 2);
        assert_eq!(order.history()[1].timestamp, later);
    }

    #[test]
    fn test_apply_stale_leaves_order_untouched() {
        let mut order = Order::receive(new_order(), at()).unwrap();
        let before = order.clone();
        assert_eq!(order.apply(Trigger::ValidatedEvent, at()).unwrap(), Transition::Stale);
        assert_eq!(order, before);
    }

    #[test]
    fn test_approval_sets_finished_at_once() {
        let mut order = Order::receive(new_order(), at()).unwrap();
        order.apply(Trigger::UnderwritingPassed, at()).unwrap();
        order.apply(Trigger::ValidatedEvent, at()).unwrap();
        order.apply(Trigger::SubscriptionActivated, at()).unwrap();

        assert_eq!(order.status(), OrderStatus::Approved);
        assert_eq!(order.finished_at(), Some(at() + Duration::days(365)));
    }

    #[test]
    fn test_cancel_terminal_is_error_without_mutation() {
        let mut order = Order::receive(new_order(), at()).unwrap();
        order.apply(Trigger::UnderwritingFailed, at()).unwrap();
        let before = order.clone();

        let result = order.apply(Trigger::CancelRequested, at());
        assert!(matches!(result, Err(OrderError::InvalidStateTransition { .. })));
        assert_eq!(order, before);
    }

    #[test]
    fn test_assign_id_twice_fails() {
        let mut order = Order::receive(new_order(), at()).unwrap();
        order.assign_id(OrderId::new_v7()).unwrap();
        assert!(matches!(
            order.assign_id(OrderId::new_v7()),
            Err(OrderError::IdAlreadyAssigned(_))
        ));
    }

    #[test]
    fn test_json_document_roundtrip_keeps_invariant() {
        let mut order = Order::receive(new_order(), at()).unwrap();
        order.assign_id(OrderId::new_v7()).unwrap();
        order.apply(Trigger::UnderwritingPassed, at()).unwrap();

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "VALIDATED");
        assert_eq!(json["category"], "AUTO");

        let restored: Order = serde_json::from_value(json).unwrap();
        assert_eq!(restored, order);
    }

    #[test]
    fn test_document_with_mismatched_history_is_refused() {
        let order = Order::receive(new_order(), at()).unwrap();
        let mut json = serde_json::to_value(&order).unwrap();
        json["status"] = serde_json::json!("PENDING");

        assert!(serde_json::from_value::<Order>(json).is_err());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("PENDING".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert!("UNKNOWN".parse::<OrderStatus>().is_err());
        assert_eq!("auto".parse::<Category>().unwrap(), Category::Auto);
    }
}
