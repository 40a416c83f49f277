//! Test Data Builders
//!
//! Builds orders with sensible defaults so tests only name the fields they
//! care about. Orders in later statuses are produced by driving the
//! aggregate through its real transitions, never by patching fields.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, BTreeSet};

use core_kernel::OrderId;
use domain_order::{Category, NewOrder, Order, OrderStatus, Trigger};

use crate::fixtures::{StringFixtures, TimeFixtures};

/// Builder for constructing test orders
#[derive(Debug, Clone)]
pub struct TestOrderBuilder {
    id: Option<OrderId>,
    customer_id: String,
    product_id: String,
    category: Category,
    sales_channel: String,
    payment_method: String,
    total_monthly_premium_amount: Decimal,
    insured_amount: Decimal,
    coverages: BTreeMap<String, Decimal>,
    assistances: BTreeSet<String>,
    created_at: DateTime<Utc>,
}

impl Default for TestOrderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestOrderBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            customer_id: StringFixtures::customer_id().to_string(),
            product_id: StringFixtures::product_id().to_string(),
            category: Category::Auto,
            sales_channel: "MOBILE".to_string(),
            payment_method: "CREDIT_CARD".to_string(),
            total_monthly_premium_amount: dec!(75.25),
            insured_amount: dec!(275000.50),
            coverages: BTreeMap::from([
                ("Roubo".to_string(), dec!(100000.25)),
                ("Perda Total".to_string(), dec!(100000.25)),
            ]),
            assistances: BTreeSet::from(["Guincho ate 250km".to_string()]),
            created_at: TimeFixtures::processing_time() - Duration::hours(1),
        }
    }

    pub fn with_id(mut self, id: OrderId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = customer_id.into();
        self
    }

    pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = product_id.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_insured_amount(mut self, amount: Decimal) -> Self {
        self.insured_amount = amount;
        self
    }

    pub fn with_premium(mut self, amount: Decimal) -> Self {
        self.total_monthly_premium_amount = amount;
        self
    }

    pub fn with_coverage(mut self, name: impl Into<String>, amount: Decimal) -> Self {
        self.coverages.insert(name.into(), amount);
        self
    }

    pub fn with_assistance(mut self, name: impl Into<String>) -> Self {
        self.assistances.insert(name.into());
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    /// Creation input for the order service
    pub fn build_new(&self) -> NewOrder {
        NewOrder {
            customer_id: self.customer_id.clone(),
            product_id: self.product_id.clone(),
            category: self.category,
            sales_channel: self.sales_channel.clone(),
            payment_method: self.payment_method.clone(),
            total_monthly_premium_amount: self.total_monthly_premium_amount,
            insured_amount: self.insured_amount,
            coverages: self.coverages.clone(),
            assistances: self.assistances.clone(),
        }
    }

    /// An order in RECEIVED
    ///
    /// # Panics
    ///
    /// Panics if the configured fields fail validation
    pub fn build(&self) -> Order {
        let mut order = Order::receive(self.build_new(), self.created_at)
            .expect("builder produced invalid order input");
        if let Some(id) = self.id {
            order.assign_id(id).expect("fresh order has no id");
        }
        order
    }

    /// An order driven through the lifecycle until it reaches `status`
    ///
    /// Each step is stamped one minute after the previous one.
    pub fn build_in(&self, status: OrderStatus) -> Order {
        let mut order = self.build();
        let mut at = self.created_at;
        for trigger in path_to(status) {
            at += Duration::minutes(1);
            order.apply(*trigger, at).expect("path uses legal transitions");
        }
        order
    }
}

/// Triggers leading from RECEIVED to `status`
pub fn path_to(status: OrderStatus) -> &'static [Trigger] {
    match status {
        OrderStatus::Received => &[],
        OrderStatus::Validated => &[Trigger::UnderwritingPassed],
        OrderStatus::Pending => &[Trigger::UnderwritingPassed, Trigger::ValidatedEvent],
        OrderStatus::Approved => &[
            Trigger::UnderwritingPassed,
            Trigger::ValidatedEvent,
            Trigger::SubscriptionActivated,
        ],
        OrderStatus::Rejected => &[Trigger::UnderwritingFailed],
        OrderStatus::Cancelled => &[Trigger::CancelRequested],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_in_every_status() {
        for status in OrderStatus::ALL {
            let order = TestOrderBuilder::new().build_in(status);
            assert_eq!(order.status(), status);
            assert_eq!(order.history().len(), path_to(status).len() + 1);
        }
    }

    #[test]
    fn test_with_id() {
        let id = OrderId::new_v7();
        assert_eq!(TestOrderBuilder::new().with_id(id).build().id(), Some(id));
    }
}
