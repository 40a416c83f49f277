//! Infrastructure Database Layer
//!
//! PostgreSQL adapters for the order lifecycle, built on SQLx runtime
//! queries.
//!
//! # Storage Model
//!
//! - `orders`: one JSONB document per aggregate plus the columns queried
//!   directly (customer, status, creation time)
//! - `payment_markers`: one row per recorded, not yet consumed payment
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, ensure_schema, DatabaseConfig, PostgresOrderRepository};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/orders")).await?;
//! ensure_schema(&pool).await?;
//! let repository = PostgresOrderRepository::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{PostgresIdempotencyCache, PostgresOrderRepository};
pub use error::DatabaseError;
pub use pool::{create_pool, ensure_schema, DatabaseConfig, DatabasePool};
