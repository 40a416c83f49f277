//! HTTP surface tests over in-memory ports

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use core_kernel::{Clock, OrderId};
use domain_order::{Classification, OrderService, OrderStatus};
use interface_api::messaging::{EventBusConfig, InMemoryEventBus};
use interface_api::{create_router, dto::order::CreateOrderResponse, AppState};
use test_utils::{StringFixtures, TestHarness, TestOrderBuilder, TimeFixtures};

fn state(harness: &TestHarness) -> AppState {
    let service = Arc::new(OrderService::new(
        harness.repository.clone(),
        harness.publisher.clone(),
        harness.orchestrator.clone(),
        harness.clock.clone() as Arc<dyn Clock>,
    ));
    AppState::new(service, Vec::new())
}

fn server(harness: &TestHarness) -> TestServer {
    TestServer::new(create_router(state(harness))).unwrap()
}

/// Server whose event ingestion feeds a consumer over the harness router
fn server_with_events(harness: &TestHarness) -> TestServer {
    let (bus, consumer) = InMemoryEventBus::new(EventBusConfig {
        redelivery_delay: Duration::from_millis(20),
        max_redeliveries: 3,
        channel_capacity: 8,
    });
    tokio::spawn(consumer.run(harness.router.clone()));
    TestServer::new(create_router(state(harness).with_event_bus(bus))).unwrap()
}

fn order_body() -> Value {
    json!({
        "customer_id": StringFixtures::customer_id(),
        "product_id": StringFixtures::product_id(),
        "category": "AUTO",
        "sales_channel": "MOBILE",
        "payment_method": "CREDIT_CARD",
        "total_monthly_premium_amount": "75.25",
        "insured_amount": "275000.50",
        "coverages": {"Roubo": "100000.25"},
        "assistances": ["Guincho ate 250km"]
    })
}

// ============= CREATE TESTS =============
mod create_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_returns_id_and_timestamp() {
        let harness = TestHarness::new(Classification::Regular);
        let server = server(&harness);

        let response = server.post("/orders").json(&order_body()).await;

        assert_eq!(response.status_code(), StatusCode::CREATED);
        let created: CreateOrderResponse = response.json();
        assert_eq!(created.timestamp, TimeFixtures::processing_time());
        assert_eq!(
            harness.publisher.published().await,
            vec![(created.id, OrderStatus::Received)]
        );
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let harness = TestHarness::new(Classification::Regular);
        let server = server(&harness);

        let mut blank_customer = order_body();
        blank_customer["customer_id"] = json!("");
        let mut unknown_category = order_body();
        unknown_category["category"] = json!("PET");
        let mut negative_amount = order_body();
        negative_amount["insured_amount"] = json!("-1");

        for body in [blank_customer, unknown_category, negative_amount] {
            let response = server.post("/orders").json(&body).await;
            assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(response.json::<Value>()["error"], "validation_error");
        }
        assert_eq!(harness.repository.save_count(), 0);
    }
}

// ============= QUERY TESTS =============
mod query_tests {
    use super::*;

    #[tokio::test]
    async fn test_get_order() {
        let harness = TestHarness::new(Classification::Regular);
        let id = harness
            .seed(TestOrderBuilder::new().build_in(OrderStatus::Pending))
            .await;
        let server = server(&harness);

        let response = server.get(&format!("/orders/{}", id)).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["id"], id.as_uuid().to_string());
        assert_eq!(body["status"], "PENDING");
        assert_eq!(body["history"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn test_get_missing_and_malformed_ids() {
        let harness = TestHarness::new(Classification::Regular);
        let server = server(&harness);

        let missing = server
            .get(&format!("/orders/{}", OrderId::new_v7().as_uuid()))
            .await;
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let malformed = server.get("/orders/not-an-id").await;
        assert_eq!(malformed.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_by_customer() {
        let harness = TestHarness::new(Classification::Regular);
        harness
            .seed(TestOrderBuilder::new().with_customer_id("CUST-9").build())
            .await;
        harness
            .seed(TestOrderBuilder::new().with_customer_id("CUST-9").build())
            .await;
        let server = server(&harness);

        let listed = server.get("/orders/customer/CUST-9").await;
        assert_eq!(listed.status_code(), StatusCode::OK);
        assert_eq!(listed.json::<Vec<Value>>().len(), 2);

        let empty = server.get("/orders/customer/CUST-0").await;
        assert_eq!(empty.status_code(), StatusCode::NO_CONTENT);
    }
}

// ============= CANCEL TESTS =============
mod cancel_tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_pending_order() {
        let harness = TestHarness::new(Classification::Regular);
        let id = harness
            .seed(TestOrderBuilder::new().build_in(OrderStatus::Pending))
            .await;
        let server = server(&harness);

        let response = server.patch(&format!("/orders/{}", id)).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>()["status"], "CANCELLED");
        assert_eq!(harness.stored(id).await.status(), OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_approved_order_is_unprocessable() {
        let harness = TestHarness::new(Classification::Regular);
        let id = harness
            .seed(TestOrderBuilder::new().build_in(OrderStatus::Approved))
            .await;
        let server = server(&harness);

        let response = server.patch(&format!("/orders/{}", id)).await;

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(harness.stored(id).await.status(), OrderStatus::Approved);
    }

    #[tokio::test]
    async fn test_cancel_missing_order() {
        let harness = TestHarness::new(Classification::Regular);
        let server = server(&harness);

        let response = server
            .patch(&format!("/orders/{}", OrderId::new_v7()))
            .await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}

// ============= EVENT INGESTION TESTS =============
mod event_ingestion_tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    async fn wait_for_marker(harness: &TestHarness, id: OrderId) -> Option<String> {
        for _ in 0..100 {
            if let Some(marker) = harness.marker(id).await {
                return Some(marker);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        None
    }

    #[tokio::test]
    async fn test_payment_posted_to_topic_records_marker() {
        let harness = TestHarness::new(Classification::Regular);
        let id = harness
            .seed(TestOrderBuilder::new().build_in(OrderStatus::Pending))
            .await;
        let server = server_with_events(&harness);

        let response = server
            .post("/events/payments-topic")
            .json(&json!({"id": StringFixtures::payment_id(), "order_id": id.as_uuid().to_string()}))
            .await;

        assert_eq!(response.status_code(), StatusCode::ACCEPTED);
        assert_eq!(
            wait_for_marker(&harness, id).await.as_deref(),
            Some(StringFixtures::payment_id())
        );
        assert_eq!(harness.stored(id).await.status(), OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_status_header_is_carried_over() {
        let harness = TestHarness::new(Classification::Regular);
        let id = harness
            .seed(TestOrderBuilder::new().build_in(OrderStatus::Received))
            .await;
        let server = server_with_events(&harness);

        let response = server
            .post("/events/orders-topic")
            .add_header(
                HeaderName::from_static("orderstatus"),
                HeaderValue::from_static("RECEIVED"),
            )
            .json(&json!({"id": id.as_uuid().to_string()}))
            .await;

        assert_eq!(response.status_code(), StatusCode::ACCEPTED);
        for _ in 0..100 {
            if harness.stored(id).await.status() != OrderStatus::Received {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(harness.stored(id).await.history().len(), 2);
        assert_eq!(harness.classifier.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_topic_is_not_found() {
        let harness = TestHarness::new(Classification::Regular);
        let server = server_with_events(&harness);

        let response = server.post("/events/claims-topic").json(&json!({})).await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ingestion_without_bus_is_unavailable() {
        let harness = TestHarness::new(Classification::Regular);
        let server = server(&harness);

        let response = server.post("/events/payments-topic").json(&json!({})).await;

        assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.json::<Value>()["error"], "service_unavailable");
    }
}

// ============= HEALTH TESTS =============
mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoints() {
        let harness = TestHarness::new(Classification::Regular);
        let server = server(&harness);

        let health = server.get("/health").await;
        assert_eq!(health.status_code(), StatusCode::OK);
        assert_eq!(health.json::<Value>()["status"], "healthy");

        let ready = server.get("/health/ready").await;
        assert_eq!(ready.status_code(), StatusCode::OK);
        assert_eq!(ready.json::<Value>()["status"], "ready");
    }
}
