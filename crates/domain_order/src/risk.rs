//! Risk classification result returned by the external scoring service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk class assigned to a customer for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Regular,
    HighRisk,
    Preferential,
    NoInformation,
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Classification::Regular,
        Classification::HighRisk,
        Classification::Preferential,
        Classification::NoInformation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Regular => "REGULAR",
            Classification::HighRisk => "HIGH_RISK",
            Classification::Preferential => "PREFERENTIAL",
            Classification::NoInformation => "NO_INFORMATION",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded incident the scoring service took into account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: String,
    pub product_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a risk analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskClassification {
    pub order_id: String,
    pub customer_id: String,
    pub analyzed_at: DateTime<Utc>,
    pub classification: Classification,
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
}
