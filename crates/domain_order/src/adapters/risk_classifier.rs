//! HTTP Risk Classifier Adapter
//!
//! Calls the external risk scoring service over REST and implements the
//! `RiskClassifier` port.
//!
//! # Error Handling
//!
//! Failures are mapped to `PortError` variants:
//! - Connect failures -> `PortError::Connection`
//! - Timeouts -> `PortError::Timeout`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Other non-success statuses -> `PortError::Internal`
//! - A `null` or undecodable body -> `PortError::Transformation`

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use core_kernel::{DomainPort, PortError};

use crate::order::Order;
use crate::ports::RiskClassifier;
use crate::risk::RiskClassification;

const SERVICE_NAME: &str = "risk-classification";

/// Configuration for the HTTP risk classifier
#[derive(Debug, Clone)]
pub struct HttpRiskClassifierConfig {
    /// Endpoint receiving the classification request
    pub url: String,
    pub connect_timeout: Duration,
    /// Upper bound on waiting for the response
    pub read_timeout: Duration,
}

impl Default for HttpRiskClassifierConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9999/api/v1/fraud".to_string(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize)]
struct ClassificationRequest<'a> {
    customer_id: &'a str,
    order_id: String,
}

/// Risk classifier backed by the REST scoring service
#[derive(Debug, Clone)]
pub struct HttpRiskClassifier {
    config: HttpRiskClassifierConfig,
    client: reqwest::Client,
}

impl HttpRiskClassifier {
    /// Builds the adapter and its connection pool
    pub fn new(config: HttpRiskClassifierConfig) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .build()
            .map_err(|e| PortError::Internal {
                message: format!("failed to build HTTP client: {}", e),
                source: Some(Box::new(e)),
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpRiskClassifierConfig {
        &self.config
    }

    fn map_send_error(&self, error: reqwest::Error) -> PortError {
        if error.is_timeout() {
            PortError::Timeout {
                operation: format!("POST {}", self.config.url),
                duration_ms: self.config.read_timeout.as_millis() as u64,
            }
        } else if error.is_connect() {
            PortError::Connection {
                message: format!("cannot reach {}", self.config.url),
                source: Some(Box::new(error)),
            }
        } else {
            PortError::Internal {
                message: format!("request to {} failed", self.config.url),
                source: Some(Box::new(error)),
            }
        }
    }
}

impl DomainPort for HttpRiskClassifier {}

#[async_trait]
impl RiskClassifier for HttpRiskClassifier {
    async fn classify(&self, order: &Order) -> Result<RiskClassification, PortError> {
        let order_id = order
            .id()
            .ok_or_else(|| PortError::validation("cannot classify an order without id"))?;

        let request = ClassificationRequest {
            customer_id: order.customer_id(),
            order_id: order_id.as_uuid().to_string(),
        };

        tracing::debug!(order_id = %order_id, url = %self.config.url, "Requesting risk classification");

        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(PortError::ServiceUnavailable {
                service: format!("{} answered {}", SERVICE_NAME, status),
            });
        }
        if !status.is_success() {
            return Err(PortError::internal(format!(
                "{} answered {}",
                SERVICE_NAME, status
            )));
        }

        let body: Option<RiskClassification> = response
            .json()
            .await
            .map_err(|e| PortError::transformation(format!("invalid classification body: {}", e)))?;

        let classification = body.ok_or_else(|| {
            PortError::transformation(format!("{} returned no classification", SERVICE_NAME))
        })?;

        tracing::debug!(
            order_id = %order_id,
            classification = %classification.classification,
            "Risk classification received"
        );
        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::order::{Category, NewOrder};
    use core_kernel::OrderId;

    fn unsaved_order() -> Order {
        Order::receive(
            NewOrder {
                customer_id: "7c2a27ba-71ef-4dd8-a3cf-5e094316ffd8".to_string(),
                product_id: "1b2da7cc-b367-4196-8a78-9cfeec21f587".to_string(),
                category: Category::Residential,
                sales_channel: "MOBILE".to_string(),
                payment_method: "CREDIT_CARD".to_string(),
                total_monthly_premium_amount: rust_decimal::Decimal::ONE_HUNDRED,
                insured_amount: rust_decimal::Decimal::ONE_THOUSAND,
                coverages: Default::default(),
                assistances: Default::default(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn saved_order() -> Order {
        let mut order = unsaved_order();
        order.assign_id(OrderId::new_v7()).unwrap();
        order
    }

    #[test]
    fn test_default_timeouts() {
        let config = HttpRiskClassifierConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.read_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(ClassificationRequest {
            customer_id: "c-1",
            order_id: "o-1".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"customer_id": "c-1", "order_id": "o-1"}));
    }

    #[tokio::test]
    async fn test_unsaved_order_is_rejected() {
        let classifier = HttpRiskClassifier::new(HttpRiskClassifierConfig::default()).unwrap();
        let unsaved = unsaved_order();

        let error = classifier.classify(&unsaved).await.unwrap_err();
        assert!(matches!(error, PortError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transient() {
        let classifier = HttpRiskClassifier::new(HttpRiskClassifierConfig {
            url: "http://127.0.0.1:1/api/v1/fraud".to_string(),
            connect_timeout: Duration::from_millis(500),
            read_timeout: Duration::from_secs(1),
        })
        .unwrap();

        let error = classifier.classify(&saved_order()).await.unwrap_err();
        assert!(error.is_transient(), "unexpected error: {}", error);
    }
}
