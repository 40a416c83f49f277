//! Property-Based Test Generators
//!
//! Proptest strategies for order inputs and lifecycle triggers.

use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_order::{Category, Classification, OrderStatus, Trigger};

use crate::builders::TestOrderBuilder;

pub fn category_strategy() -> impl Strategy<Value = Category> {
    prop_oneof![
        Just(Category::Life),
        Just(Category::Auto),
        Just(Category::Residential),
        Just(Category::Other),
    ]
}

pub fn classification_strategy() -> impl Strategy<Value = Classification> {
    prop_oneof![
        Just(Classification::Regular),
        Just(Classification::HighRisk),
        Just(Classification::Preferential),
        Just(Classification::NoInformation),
    ]
}

pub fn status_strategy() -> impl Strategy<Value = OrderStatus> {
    prop::sample::select(OrderStatus::ALL.to_vec())
}

pub fn trigger_strategy() -> impl Strategy<Value = Trigger> {
    prop_oneof![
        Just(Trigger::UnderwritingPassed),
        Just(Trigger::UnderwritingFailed),
        Just(Trigger::ValidatedEvent),
        Just(Trigger::SubscriptionActivated),
        Just(Trigger::CancelRequested),
    ]
}

/// Insured amounts with cents, up to one million
pub fn insured_amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Builders varying the fields underwriting looks at
pub fn order_builder_strategy() -> impl Strategy<Value = TestOrderBuilder> {
    (category_strategy(), insured_amount_strategy()).prop_map(|(category, insured)| {
        TestOrderBuilder::new()
            .with_category(category)
            .with_insured_amount(insured)
    })
}
