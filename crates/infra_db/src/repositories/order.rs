//! Order document repository
//!
//! Each order is one row holding the full aggregate as JSONB. Writes are
//! upserts keyed by id, so the last write wins.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// One stored order
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub customer_id: String,
    pub status: String,
    pub document: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository for order documents
#[derive(Debug, Clone)]
pub struct OrderDocumentRepository {
    pool: PgPool,
}

impl OrderDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or replaces the document for `id`
    pub async fn upsert(
        &self,
        id: Uuid,
        customer_id: &str,
        status: &str,
        document: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, status, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, now())
            ON CONFLICT (id) DO UPDATE
            SET customer_id = EXCLUDED.customer_id,
                status = EXCLUDED.status,
                document = EXCLUDED.document,
                updated_at = now()
            "#,
        )
        .bind(id)
        .bind(customer_id)
        .bind(status)
        .bind(document)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderRow>, DatabaseError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_id, status, document, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// All orders of a customer, oldest first
    pub async fn find_by_customer(&self, customer_id: &str) -> Result<Vec<OrderRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_id, status, document, created_at, updated_at
            FROM orders
            WHERE customer_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
