//! External Adapters for the Order Domain
//!
//! - **HttpRiskClassifier**: calls the risk scoring service over REST
//!
//! In-memory mocks for every port live in [`crate::ports::mock`].

pub mod risk_classifier;

pub use risk_classifier::{HttpRiskClassifier, HttpRiskClassifierConfig};
