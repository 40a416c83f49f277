//! Payment marker repository

use sqlx::PgPool;

use crate::error::DatabaseError;

/// Repository for the `payment_markers` table
#[derive(Debug, Clone)]
pub struct PaymentMarkerRepository {
    pool: PgPool,
}

impl PaymentMarkerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT payment_id FROM payment_markers WHERE order_key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    /// Stores or replaces the marker
    pub async fn upsert(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO payment_markers (order_key, payment_id)
            VALUES ($1, $2)
            ON CONFLICT (order_key) DO UPDATE
            SET payment_id = EXCLUDED.payment_id, recorded_at = now()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Stores the marker unless one exists; returns true if a row was written
    pub async fn insert_if_absent(&self, key: &str, value: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            r#"
            INSERT INTO payment_markers (order_key, payment_id)
            VALUES ($1, $2)
            ON CONFLICT (order_key) DO NOTHING
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Removes the marker; returns true if one was present
    pub async fn delete(&self, key: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM payment_markers WHERE order_key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
