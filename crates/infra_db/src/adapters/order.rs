//! PostgreSQL Order Adapter
//!
//! Implements `OrderRepository` on top of [`OrderDocumentRepository`]. The
//! aggregate is serialized whole; loading goes back through the aggregate's
//! checked deserialization, so a document that breaks the history invariant
//! surfaces as a transformation error.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresOrderRepository;
//! use domain_order::OrderRepository;
//! use std::sync::Arc;
//!
//! let repository: Arc<dyn OrderRepository> = Arc::new(PostgresOrderRepository::new(pool));
//! let order = repository.find_by_id(order_id).await?;
//! ```

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, OrderId, PortError};
use domain_order::{Order, OrderRepository};

use crate::error::DatabaseError;
use crate::repositories::{OrderDocumentRepository, OrderRow};

/// PostgreSQL-backed implementation of the OrderRepository port
#[derive(Debug, Clone)]
pub struct PostgresOrderRepository {
    repository: OrderDocumentRepository,
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: OrderDocumentRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresOrderRepository {}

#[async_trait]
impl HealthCheckable for PostgresOrderRepository {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-order-repository").await
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    #[instrument(skip(self, order), fields(order_id = ?order.id(), status = %order.status()))]
    async fn save(&self, mut order: Order) -> Result<Order, PortError> {
        let id = match order.id() {
            Some(id) => id,
            None => {
                let id = OrderId::new_v7();
                order
                    .assign_id(id)
                    .map_err(|e| PortError::internal(e.to_string()))?;
                id
            }
        };

        let document = serde_json::to_value(&order)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        self.repository
            .upsert(
                *id.as_uuid(),
                order.customer_id(),
                order.status().as_str(),
                document,
                order.created_at(),
            )
            .await?;

        debug!(order_id = %id, "Order saved");
        Ok(order)
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn find_by_id(&self, id: OrderId) -> Result<Order, PortError> {
        let row = self
            .repository
            .find_by_id(*id.as_uuid())
            .await?
            .ok_or_else(|| DatabaseError::not_found("Order", id))?;

        Ok(row_to_order(row)?)
    }

    #[instrument(skip(self))]
    async fn find_all_by_customer(&self, customer_id: &str) -> Result<Vec<Order>, PortError> {
        let rows = self.repository.find_by_customer(customer_id).await?;
        let orders = rows
            .into_iter()
            .map(row_to_order)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(orders)
    }
}

fn row_to_order(row: OrderRow) -> Result<Order, DatabaseError> {
    serde_json::from_value(row.document).map_err(|e| {
        DatabaseError::SerializationError(format!("order {} has an invalid document: {}", row.id, e))
    })
}
