//! Underwriting domain logic
//!
//! Decides whether an order's insured amount is acceptable for the risk class
//! the scoring service assigned to the customer. The decision is a pure
//! function of (classification, category, insured amount).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::order::{Category, OrderStatus};
use crate::risk::Classification;
use crate::transitions::Trigger;

/// Upper bound on the insured amount for one (classification, category) cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderwritingLimit {
    /// The bound itself
    pub amount: Decimal,
    /// Whether an amount equal to the bound is accepted
    pub inclusive: bool,
}

impl UnderwritingLimit {
    const fn up_to(amount: Decimal) -> Self {
        Self { amount, inclusive: true }
    }

    const fn below(amount: Decimal) -> Self {
        Self { amount, inclusive: false }
    }

    /// Returns true if `insured_amount` falls inside the limit
    pub fn admits(&self, insured_amount: Decimal) -> bool {
        if self.inclusive {
            insured_amount <= self.amount
        } else {
            insured_amount < self.amount
        }
    }
}

/// Looks up the limit for a classification and category
pub fn limit_for(classification: Classification, category: Category) -> UnderwritingLimit {
    use Category::*;
    use Classification::*;

    match (classification, category) {
        (Regular, Life) => UnderwritingLimit::up_to(dec!(500000)),
        (Regular, Auto) => UnderwritingLimit::up_to(dec!(350000)),
        (Regular, Residential) => UnderwritingLimit::up_to(dec!(500000)),
        (Regular, Other) => UnderwritingLimit::up_to(dec!(255000)),

        (HighRisk, Life) => UnderwritingLimit::up_to(dec!(125000)),
        (HighRisk, Auto) => UnderwritingLimit::up_to(dec!(250000)),
        (HighRisk, Residential) => UnderwritingLimit::up_to(dec!(150000)),
        (HighRisk, Other) => UnderwritingLimit::up_to(dec!(125000)),

        // Strict bound except for OTHER
        (Preferential, Life) => UnderwritingLimit::below(dec!(800000)),
        (Preferential, Auto) => UnderwritingLimit::below(dec!(450000)),
        (Preferential, Residential) => UnderwritingLimit::below(dec!(450000)),
        (Preferential, Other) => UnderwritingLimit::up_to(dec!(375000)),

        (NoInformation, Life) => UnderwritingLimit::up_to(dec!(200000)),
        (NoInformation, Auto) => UnderwritingLimit::up_to(dec!(75000)),
        (NoInformation, Residential) => UnderwritingLimit::up_to(dec!(200000)),
        (NoInformation, Other) => UnderwritingLimit::up_to(dec!(55000)),
    }
}

/// Returns true if the insured amount is acceptable for the risk class
pub fn is_within_limit(
    classification: Classification,
    category: Category,
    insured_amount: Decimal,
) -> bool {
    limit_for(classification, category).admits(insured_amount)
}

/// Underwriting decision result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnderwritingDecision {
    Validated,
    Rejected,
}

impl UnderwritingDecision {
    /// Trigger to feed into the order lifecycle
    pub fn trigger(&self) -> Trigger {
        match self {
            UnderwritingDecision::Validated => Trigger::UnderwritingPassed,
            UnderwritingDecision::Rejected => Trigger::UnderwritingFailed,
        }
    }

    /// Status the order ends up in
    pub fn status(&self) -> OrderStatus {
        match self {
            UnderwritingDecision::Validated => OrderStatus::Validated,
            UnderwritingDecision::Rejected => OrderStatus::Rejected,
        }
    }
}

/// Evaluates an application against the limit table
pub fn evaluate(
    classification: Classification,
    category: Category,
    insured_amount: Decimal,
) -> UnderwritingDecision {
    if is_within_limit(classification, category, insured_amount) {
        UnderwritingDecision::Validated
    } else {
        UnderwritingDecision::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_auto() {
        assert_eq!(
            evaluate(Classification::Regular, Category::Auto, dec!(340000)),
            UnderwritingDecision::Validated
        );
        assert_eq!(
            evaluate(Classification::Regular, Category::Auto, dec!(360000)),
            UnderwritingDecision::Rejected
        );
    }

    #[test]
    fn test_preferential_life_is_strict() {
        let limit = limit_for(Classification::Preferential, Category::Life);
        assert!(!limit.inclusive);
        assert!(!limit.admits(dec!(800000)));
        assert!(limit.admits(dec!(799999.99)));
    }

    #[test]
    fn test_preferential_other_is_inclusive() {
        assert!(is_within_limit(
            Classification::Preferential,
            Category::Other,
            dec!(375000)
        ));
    }

    #[test]
    fn test_decision_maps_to_trigger() {
        assert_eq!(UnderwritingDecision::Validated.trigger(), Trigger::UnderwritingPassed);
        assert_eq!(UnderwritingDecision::Rejected.status(), OrderStatus::Rejected);
    }
}
