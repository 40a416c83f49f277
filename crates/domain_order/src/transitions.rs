//! Order state transition table
//!
//! A pure function from (current status, trigger) to the move the lifecycle
//! allows. Every combination is spelled out; there is no fallthrough arm, so
//! adding a status or trigger forces this table to be revisited.
//!
//! ```text
//! RECEIVED  --underwriting passes-->  VALIDATED --validated event--> PENDING
//!     \--underwriting fails--> REJECTED                                 |
//!                                              subscription + payment   |
//!                                                                       v
//!                                                                   APPROVED
//! RECEIVED | VALIDATED | PENDING --cancel--> CANCELLED
//! ```

use std::fmt;

use crate::order::OrderStatus;

/// Something that asks the lifecycle to move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Underwriting found the insured amount within the classification limit
    UnderwritingPassed,
    /// Underwriting found the insured amount above the classification limit
    UnderwritingFailed,
    /// The "order validated" event came back from the bus
    ValidatedEvent,
    /// Subscription activation arrived and a payment marker is recorded
    SubscriptionActivated,
    /// Synchronous cancel request
    CancelRequested,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trigger::UnderwritingPassed => "underwriting passed",
            Trigger::UnderwritingFailed => "underwriting failed",
            Trigger::ValidatedEvent => "validated event",
            Trigger::SubscriptionActivated => "subscription activated",
            Trigger::CancelRequested => "cancel request",
        };
        f.write_str(name)
    }
}

/// What the table allows for a (status, trigger) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move to the given status
    Move(OrderStatus),
    /// Stale or duplicate signal; leave the order untouched and acknowledge
    Stale,
    /// The request is not allowed from the current status
    Illegal,
}

/// Looks up the transition for `trigger` applied to an order in `current`
pub fn next(current: OrderStatus, trigger: Trigger) -> Transition {
    use OrderStatus::*;

    match trigger {
        Trigger::UnderwritingPassed => match current {
            Received => Transition::Move(Validated),
            Validated | Pending | Rejected | Approved | Cancelled => Transition::Stale,
        },
        Trigger::UnderwritingFailed => match current {
            Received => Transition::Move(Rejected),
            Validated | Pending | Rejected | Approved | Cancelled => Transition::Stale,
        },
        Trigger::ValidatedEvent => match current {
            Validated => Transition::Move(Pending),
            Received | Pending | Rejected | Approved | Cancelled => Transition::Stale,
        },
        Trigger::SubscriptionActivated => match current {
            Pending => Transition::Move(Approved),
            Received | Validated | Rejected | Approved | Cancelled => Transition::Stale,
        },
        Trigger::CancelRequested => match current {
            Received | Validated | Pending => Transition::Move(Cancelled),
            Approved | Rejected => Transition::Illegal,
            Cancelled => Transition::Stale,
        },
    }
}
