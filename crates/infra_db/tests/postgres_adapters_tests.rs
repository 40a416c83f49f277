//! PostgreSQL adapter tests
//!
//! These start a PostgreSQL container and are ignored by default. Run with
//! `cargo test -p infra_db -- --ignored` on a host with Docker.

use std::sync::Arc;

use core_kernel::{HealthCheckable, OrderId};
use domain_order::{IdempotencyCache, OrderRepository, OrderStatus, Trigger};
use infra_db::{PostgresIdempotencyCache, PostgresOrderRepository};
use test_utils::{
    assert_history_consistent, create_isolated_test_database, TestOrderBuilder, TimeFixtures,
};

// ============= ORDER REPOSITORY TESTS =============
mod order_repository_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_save_assigns_id_and_round_trips() {
        let db = create_isolated_test_database().await.unwrap();
        let repository = PostgresOrderRepository::new(db.pool().clone());

        let saved = repository
            .save(TestOrderBuilder::new().build())
            .await
            .unwrap();
        let id = saved.id().expect("id assigned on save");

        let loaded = repository.find_by_id(id).await.unwrap();
        assert_eq!(loaded, saved);
        assert_history_consistent(&loaded);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_save_overwrites_existing_document() {
        let db = create_isolated_test_database().await.unwrap();
        let repository = PostgresOrderRepository::new(db.pool().clone());
        let mut order = repository
            .save(TestOrderBuilder::new().build())
            .await
            .unwrap();
        let id = order.id().unwrap();

        order
            .apply(Trigger::UnderwritingPassed, TimeFixtures::processing_time())
            .unwrap();
        repository.save(order).await.unwrap();

        let loaded = repository.find_by_id(id).await.unwrap();
        assert_eq!(loaded.status(), OrderStatus::Validated);
        assert_eq!(loaded.history().len(), 2);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_find_missing_order_is_not_found() {
        let db = create_isolated_test_database().await.unwrap();
        let repository = PostgresOrderRepository::new(db.pool().clone());

        let error = repository.find_by_id(OrderId::new_v7()).await.unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_find_all_by_customer_orders_by_creation() {
        let db = create_isolated_test_database().await.unwrap();
        let repository = PostgresOrderRepository::new(db.pool().clone());
        let base = TimeFixtures::processing_time();

        let later = repository
            .save(
                TestOrderBuilder::new()
                    .with_customer_id("CUST-A")
                    .created_at(base)
                    .build(),
            )
            .await
            .unwrap();
        let earlier = repository
            .save(
                TestOrderBuilder::new()
                    .with_customer_id("CUST-A")
                    .created_at(base - chrono::Duration::days(1))
                    .build(),
            )
            .await
            .unwrap();
        repository
            .save(TestOrderBuilder::new().with_customer_id("CUST-B").build())
            .await
            .unwrap();

        let orders = repository.find_all_by_customer("CUST-A").await.unwrap();
        let ids: Vec<_> = orders.iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec![earlier.id(), later.id()]);
        assert!(repository
            .find_all_by_customer("CUST-C")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_health_check_reports_healthy() {
        let db = create_isolated_test_database().await.unwrap();
        let repository = PostgresOrderRepository::new(db.pool().clone());

        assert!(repository.health_check().await.is_operational());
    }
}

// ============= IDEMPOTENCY CACHE TESTS =============
mod idempotency_cache_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_put_get_delete() {
        let db = create_isolated_test_database().await.unwrap();
        let cache = PostgresIdempotencyCache::new(db.pool().clone());

        assert_eq!(cache.get("order-1").await.unwrap(), None);
        cache.put("order-1", "PAY-1").await.unwrap();
        cache.put("order-1", "PAY-2").await.unwrap();
        assert_eq!(cache.get("order-1").await.unwrap().as_deref(), Some("PAY-2"));

        assert!(cache.delete("order-1").await.unwrap());
        assert!(!cache.delete("order-1").await.unwrap());
        assert_eq!(cache.get("order-1").await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_put_if_absent_admits_one_writer() {
        let db = create_isolated_test_database().await.unwrap();
        let cache = Arc::new(PostgresIdempotencyCache::new(db.pool().clone()));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache
                        .put_if_absent("order-race", &format!("PAY-{}", i))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut winners = 0;
        for task in tasks {
            if task.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert!(cache.get("order-race").await.unwrap().is_some());
    }
}
