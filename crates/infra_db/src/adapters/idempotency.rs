//! PostgreSQL Idempotency Cache Adapter
//!
//! `put_if_absent` is a single `INSERT ... ON CONFLICT DO NOTHING`, so two
//! concurrent payments for the same order cannot both record a marker.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_order::IdempotencyCache;

use crate::repositories::PaymentMarkerRepository;

/// PostgreSQL-backed implementation of the IdempotencyCache port
#[derive(Debug, Clone)]
pub struct PostgresIdempotencyCache {
    markers: PaymentMarkerRepository,
    pool: PgPool,
}

impl PostgresIdempotencyCache {
    pub fn new(pool: PgPool) -> Self {
        Self {
            markers: PaymentMarkerRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresIdempotencyCache {}

#[async_trait]
impl HealthCheckable for PostgresIdempotencyCache {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-idempotency-cache").await
    }
}

#[async_trait]
impl IdempotencyCache for PostgresIdempotencyCache {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>, PortError> {
        Ok(self.markers.get(key).await?)
    }

    #[instrument(skip(self, value))]
    async fn put(&self, key: &str, value: &str) -> Result<(), PortError> {
        Ok(self.markers.upsert(key, value).await?)
    }

    #[instrument(skip(self, value))]
    async fn put_if_absent(&self, key: &str, value: &str) -> Result<bool, PortError> {
        Ok(self.markers.insert_if_absent(key, value).await?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<bool, PortError> {
        Ok(self.markers.delete(key).await?)
    }
}
