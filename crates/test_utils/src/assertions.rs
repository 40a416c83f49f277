//! Custom Test Assertions
//!
//! Assertion helpers for orders that explain what went wrong in domain terms.

use domain_order::{Order, OrderStatus};

/// Asserts the history invariant: non-empty, last entry matches the status,
/// timestamps never go backwards
pub fn assert_history_consistent(order: &Order) {
    let history = order.history();
    assert!(!history.is_empty(), "Order {:?} has an empty history", order.id());

    let last = &history[history.len() - 1];
    assert_eq!(
        last.status,
        order.status(),
        "Last history entry {} does not match status {}",
        last.status,
        order.status()
    );

    for pair in history.windows(2) {
        assert!(
            pair[0].timestamp <= pair[1].timestamp,
            "History goes backwards: {} at {} then {} at {}",
            pair[0].status,
            pair[0].timestamp,
            pair[1].status,
            pair[1].timestamp
        );
    }
}

/// Asserts the sequence of statuses recorded in the history
pub fn assert_history_statuses(order: &Order, expected: &[OrderStatus]) {
    let actual: Vec<OrderStatus> = order.history().iter().map(|entry| entry.status).collect();
    assert_eq!(actual, expected, "Unexpected status history");
}

/// Asserts that `before` is a prefix of `after`'s history
pub fn assert_history_extends(before: &Order, after: &Order) {
    let old = before.history();
    let new = after.history();
    assert!(
        new.len() >= old.len(),
        "History shrank from {} to {} entries",
        old.len(),
        new.len()
    );
    assert_eq!(&new[..old.len()], old, "Existing history entries were rewritten");
}

/// Asserts the order is in `expected` and its history agrees
pub fn assert_status(order: &Order, expected: OrderStatus) {
    assert_eq!(
        order.status(),
        expected,
        "Expected order in {}, found {}",
        expected,
        order.status()
    );
    assert_history_consistent(order);
}
