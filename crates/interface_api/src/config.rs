//! API configuration

use serde::Deserialize;
use std::time::Duration;

use domain_order::adapters::HttpRiskClassifierConfig;

use crate::messaging::EventBusConfig;

/// API configuration
///
/// Every field can be set through an `API_`-prefixed environment variable,
/// e.g. `API_PORT` or `API_RISK_CLASSIFIER_URL`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Log level or `EnvFilter` directive
    pub log_level: String,
    /// `json` or `pretty`
    pub log_format: String,
    /// Risk classification endpoint
    pub risk_classifier_url: String,
    pub risk_classifier_connect_timeout_ms: u64,
    pub risk_classifier_read_timeout_ms: u64,
    /// Delay before a withheld message is delivered again
    pub redelivery_delay_ms: u64,
    /// Redeliveries attempted before a message is dead-lettered
    pub max_redeliveries: u32,
    /// Capacity of the external event submission channel
    pub channel_capacity: usize,
    /// Time the event consumer gets to drain after the server stops
    pub shutdown_grace_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let classifier = HttpRiskClassifierConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/orders".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            risk_classifier_url: classifier.url,
            risk_classifier_connect_timeout_ms: classifier.connect_timeout.as_millis() as u64,
            risk_classifier_read_timeout_ms: classifier.read_timeout.as_millis() as u64,
            redelivery_delay_ms: 1_000,
            max_redeliveries: 5,
            channel_capacity: 1_024,
            shutdown_grace_ms: 10_000,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }

    pub fn risk_classifier(&self) -> HttpRiskClassifierConfig {
        HttpRiskClassifierConfig {
            url: self.risk_classifier_url.clone(),
            connect_timeout: Duration::from_millis(self.risk_classifier_connect_timeout_ms),
            read_timeout: Duration::from_millis(self.risk_classifier_read_timeout_ms),
        }
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    pub fn event_bus(&self) -> EventBusConfig {
        EventBusConfig {
            redelivery_delay: Duration::from_millis(self.redelivery_delay_ms),
            max_redeliveries: self.max_redeliveries,
            channel_capacity: self.channel_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_classifier_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.risk_classifier().connect_timeout, Duration::from_secs(5));
        assert_eq!(config.risk_classifier().read_timeout, Duration::from_secs(10));
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert!(!config.json_logs());
        assert_eq!(config.shutdown_grace(), Duration::from_secs(10));
    }

    #[test]
    fn test_event_bus_settings() {
        let config = ApiConfig {
            redelivery_delay_ms: 250,
            max_redeliveries: 2,
            channel_capacity: 16,
            ..ApiConfig::default()
        };
        let bus = config.event_bus();
        assert_eq!(bus.redelivery_delay, Duration::from_millis(250));
        assert_eq!(bus.max_redeliveries, 2);
        assert_eq!(bus.channel_capacity, 16);
    }
}
