//! Order Lifecycle API Server Binary
//!
//! Starts the HTTP API together with the event consumer that drives orders
//! through underwriting, payment and subscription.
//!
//! # Usage
//!
//! ```bash
//! API_PORT=8080 API_DATABASE_URL=postgres://... cargo run --bin order-lifecycle-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_LOG_LEVEL` - Log level or filter directive (default: info)
//! * `API_LOG_FORMAT` - `json` or `pretty` (default: pretty)
//! * `API_RISK_CLASSIFIER_URL` - Risk classification endpoint
//! * `API_RISK_CLASSIFIER_CONNECT_TIMEOUT_MS` / `API_RISK_CLASSIFIER_READ_TIMEOUT_MS`
//! * `API_REDELIVERY_DELAY_MS`, `API_MAX_REDELIVERIES`, `API_CHANNEL_CAPACITY`
//! * `API_SHUTDOWN_GRACE_MS` - Time the event consumer gets to drain (default: 10000)

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::{HealthCheckable, SystemClock};
use domain_order::adapters::HttpRiskClassifier;
use domain_order::{EventRouter, OrderService, WorkflowOrchestrator};
use infra_db::{
    create_pool, ensure_schema, DatabaseConfig, PostgresIdempotencyCache, PostgresOrderRepository,
};
use interface_api::{config::ApiConfig, create_router, messaging::InMemoryEventBus, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API_* configuration")?;
    init_tracing(&config);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        risk_classifier = %config.risk_classifier_url,
        "Starting order lifecycle API"
    );

    let pool = create_pool(DatabaseConfig::new(config.database_url.clone()))
        .await
        .context("failed to connect to the database")?;
    ensure_schema(&pool).await.context("failed to apply schema")?;

    let repository = Arc::new(PostgresOrderRepository::new(pool.clone()));
    let cache = Arc::new(PostgresIdempotencyCache::new(pool));
    let classifier = Arc::new(
        HttpRiskClassifier::new(config.risk_classifier())
            .context("failed to build risk classifier client")?,
    );
    let clock = Arc::new(SystemClock);

    let (bus, consumer) = InMemoryEventBus::new(config.event_bus());
    let publisher = Arc::new(bus.clone());

    let orchestrator = Arc::new(WorkflowOrchestrator::new(
        repository.clone(),
        cache.clone(),
        publisher.clone(),
        classifier,
        clock.clone(),
    ));
    let router = EventRouter::new(orchestrator.clone());
    let service = Arc::new(OrderService::new(
        repository.clone(),
        publisher,
        orchestrator,
        clock,
    ));

    let (stop_consumer, consumer_stopped) = tokio::sync::oneshot::channel::<()>();
    let consumer_task = tokio::spawn(consumer.run_until(router, async move {
        let _ = consumer_stopped.await;
    }));

    let health_checks: Vec<Arc<dyn HealthCheckable>> =
        vec![repository as Arc<dyn HealthCheckable>, cache];
    let app = create_router(AppState::new(service, health_checks).with_event_bus(bus));

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = stop_consumer.send(());
    match tokio::time::timeout(config.shutdown_grace(), consumer_task).await {
        Ok(Ok(report)) if report.abandoned > 0 => {
            tracing::warn!(abandoned = report.abandoned, "Event consumer stopped with undelivered messages");
        }
        Ok(Ok(_)) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Event consumer task failed"),
        Err(_) => tracing::warn!(
            grace_ms = config.shutdown_grace_ms,
            "Event consumer did not drain in time"
        ),
    }
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(config: &ApiConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().pretty().with_target(true))
            .init();
    }
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
