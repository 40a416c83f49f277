//! HTTP API Layer
//!
//! REST surface of the order lifecycle service plus the in-process event
//! bus that feeds the asynchronous workflow.
//!
//! # Architecture
//!
//! - **Handlers**: Order, event ingestion and health endpoints
//! - **DTOs**: Request/Response data transfer objects
//! - **Messaging**: Event bus and consumer loop with redelivery
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(service, health_checks).with_event_bus(bus));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod messaging;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_order::OrderService;

use crate::handlers::{events, health, orders};
use crate::messaging::InMemoryEventBus;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OrderService>,
    pub health_checks: Arc<Vec<Arc<dyn HealthCheckable>>>,
    /// Target of `POST /events/:topic`; ingestion answers 503 without it
    pub events: Option<InMemoryEventBus>,
}

impl AppState {
    pub fn new(service: Arc<OrderService>, health_checks: Vec<Arc<dyn HealthCheckable>>) -> Self {
        Self {
            service,
            health_checks: Arc::new(health_checks),
            events: None,
        }
    }

    pub fn with_event_bus(mut self, bus: InMemoryEventBus) -> Self {
        self.events = Some(bus);
        self
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let order_routes = Router::new()
        .route("/", post(orders::create_order))
        .route("/:id", get(orders::get_order).patch(orders::cancel_order))
        .route("/customer/:customer_id", get(orders::list_customer_orders));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .nest("/orders", order_routes)
        .route("/events/:topic", post(events::ingest_event))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
