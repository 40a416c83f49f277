//! Strongly-typed identifiers for domain entities
//!
//! Orders are identified by a newtype over a UUID so an order id can never be
//! confused with one of the opaque strings (customer, product, payment) that
//! travel alongside it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;

const ORDER_PREFIX: &str = "ORD";

/// Identifier of an insurance order
///
/// Assigned by the repository on first save. The display form carries an
/// `ORD-` prefix; parsing accepts the value with or without it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new time-ordered identifier (v7)
    pub fn new_v7() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the identifier prefix for display
    pub fn prefix() -> &'static str {
        ORDER_PREFIX
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", ORDER_PREFIX, self.0)
    }
}

impl FromStr for OrderId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let uuid_str = trimmed
            .strip_prefix(ORDER_PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
            .unwrap_or(trimmed);
        Uuid::parse_str(uuid_str)
            .map(Self)
            .map_err(|e| CoreError::invalid_identifier(format!("'{}' is not an order id: {}", s, e)))
    }
}

impl From<Uuid> for OrderId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<OrderId> for Uuid {
    fn from(id: OrderId) -> Uuid {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_display() {
        let id = OrderId::new_v7();
        assert!(id.to_string().starts_with("ORD-"));
    }

    #[test]
    fn test_order_id_parsing_with_prefix() {
        let original = OrderId::new_v7();
        let parsed: OrderId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_order_id_parsing_bare_uuid() {
        let uuid = Uuid::new_v4();
        let parsed: OrderId = uuid.to_string().parse().unwrap();
        assert_eq!(parsed.as_uuid(), &uuid);
    }

    #[test]
    fn test_order_id_rejects_garbage() {
        let result = "ORD-not-a-uuid".parse::<OrderId>();
        assert!(matches!(result, Err(CoreError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_order_id_serializes_as_bare_uuid() {
        let uuid = Uuid::new_v4();
        let json = serde_json::to_string(&OrderId::from(uuid)).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}
