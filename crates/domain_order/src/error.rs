//! Order domain errors
//!
//! Three kinds of failure reach callers of the synchronous path: a rejected
//! input or transition, a lookup miss, and an infrastructure failure in one of
//! the collaborators. The asynchronous path never surfaces these; the
//! orchestrator turns every error into a withheld acknowledgment.

use thiserror::Error;

use core_kernel::{CoreError, PortError};

/// Errors that can occur in the order domain
#[derive(Debug, Error)]
pub enum OrderError {
    /// Invalid state transition attempted
    #[error("Invalid state transition from {from} on {trigger}")]
    InvalidStateTransition {
        from: String,
        trigger: String,
    },

    /// Input rejected before reaching the lifecycle
    #[error("Validation error: {0}")]
    Validation(String),

    /// The order does not exist
    #[error("Order not found: {0}")]
    NotFound(String),

    /// An identifier was assigned twice
    #[error("Order already has id {0}")]
    IdAlreadyAssigned(String),

    /// A collaborator (repository, cache, classifier, bus) failed
    #[error("Infrastructure error: {0}")]
    Infrastructure(#[source] PortError),
}

impl OrderError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        OrderError::Validation(message.into())
    }

    /// Creates a not found error
    pub fn not_found(order_id: impl std::fmt::Display) -> Self {
        OrderError::NotFound(order_id.to_string())
    }

    /// Returns true for errors a client caused and can correct
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            OrderError::Validation(_) | OrderError::InvalidStateTransition { .. }
        )
    }

    /// Returns true if the order could not be found
    pub fn is_not_found(&self) -> bool {
        matches!(self, OrderError::NotFound(_))
    }
}

impl From<PortError> for OrderError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { id, .. } => OrderError::NotFound(id),
            other => OrderError::Infrastructure(other),
        }
    }
}

impl From<CoreError> for OrderError {
    fn from(error: CoreError) -> Self {
        OrderError::Validation(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_not_found_becomes_not_found() {
        let error: OrderError = PortError::not_found("Order", "ORD-1").into();
        assert!(error.is_not_found());
        assert_eq!(error.to_string(), "Order not found: ORD-1");
    }

    #[test]
    fn test_port_connection_becomes_infrastructure() {
        let error: OrderError = PortError::connection("refused").into();
        assert!(matches!(error, OrderError::Infrastructure(_)));
        assert!(!error.is_client_error());
    }

    #[test]
    fn test_invalid_transition_is_client_error() {
        let error = OrderError::InvalidStateTransition {
            from: "APPROVED".to_string(),
            trigger: "cancel".to_string(),
        };
        assert!(error.is_client_error());
        assert!(error.to_string().contains("APPROVED"));
    }
}
