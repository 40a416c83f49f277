//! Order DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use validator::Validate;

use core_kernel::OrderId;
use domain_order::{Category, HistoryEntry, NewOrder, Order, OrderStatus};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub customer_id: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub product_id: String,
    /// LIFE, AUTO, RESIDENTIAL or OTHER
    #[validate(length(min = 1, message = "must not be blank"))]
    pub category: String,
    pub sales_channel: String,
    pub payment_method: String,
    pub total_monthly_premium_amount: Decimal,
    pub insured_amount: Decimal,
    #[serde(default)]
    pub coverages: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub assistances: BTreeSet<String>,
}

impl CreateOrderRequest {
    /// Validates the request and converts it into domain input
    pub fn into_new_order(self) -> Result<NewOrder, ApiError> {
        self.validate()?;
        let category: Category = self
            .category
            .parse()
            .map_err(|_| ApiError::validation(format!("unknown category {}", self.category)))?;

        Ok(NewOrder {
            customer_id: self.customer_id,
            product_id: self.product_id,
            category,
            sales_channel: self.sales_channel,
            payment_method: self.payment_method,
            total_monthly_premium_amount: self.total_monthly_premium_amount,
            insured_amount: self.insured_amount,
            coverages: self.coverages,
            assistances: self.assistances,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub id: OrderId,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: Option<OrderId>,
    pub customer_id: String,
    pub product_id: String,
    pub category: Category,
    pub sales_channel: String,
    pub payment_method: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub total_monthly_premium_amount: Decimal,
    pub insured_amount: Decimal,
    pub coverages: BTreeMap<String, Decimal>,
    pub assistances: BTreeSet<String>,
    pub history: Vec<HistoryEntry>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id(),
            customer_id: order.customer_id().to_string(),
            product_id: order.product_id().to_string(),
            category: order.category(),
            sales_channel: order.sales_channel().to_string(),
            payment_method: order.payment_method().to_string(),
            status: order.status(),
            created_at: order.created_at(),
            finished_at: order.finished_at(),
            total_monthly_premium_amount: order.total_monthly_premium_amount(),
            insured_amount: order.insured_amount(),
            coverages: order.coverages().clone(),
            assistances: order.assistances().clone(),
            history: order.history().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(category: &str) -> CreateOrderRequest {
        serde_json::from_value(json!({
            "customer_id": "CUST-1",
            "product_id": "PROD-1",
            "category": category,
            "sales_channel": "WEB",
            "payment_method": "PIX",
            "total_monthly_premium_amount": "89.90",
            "insured_amount": "100000.00",
            "assistances": ["Chaveiro", "Chaveiro"]
        }))
        .unwrap()
    }

    #[test]
    fn test_category_is_case_insensitive() {
        let new_order = request("residential").into_new_order().unwrap();
        assert_eq!(new_order.category, Category::Residential);
        assert_eq!(new_order.assistances.len(), 1);
        assert!(new_order.coverages.is_empty());
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        assert!(matches!(
            request("PET").into_new_order(),
            Err(ApiError::Validation { .. })
        ));
    }

    #[test]
    fn test_blank_customer_is_rejected() {
        let mut blank = request("LIFE");
        blank.customer_id.clear();
        match blank.into_new_order() {
            Err(ApiError::Validation { details: Some(details), .. }) => {
                assert_eq!(details, vec!["customer_id: must not be blank".to_string()]);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
