//! Event ingestion handler
//!
//! Entry point for payment and subscription signals. The request body is
//! the message payload and an `orderStatus` header is carried over as the
//! message's status header.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};

use domain_order::events::ORDER_STATUS_HEADER;
use domain_order::{EventSource, InboundMessage};

use crate::error::ApiError;
use crate::AppState;

/// Queues a message for the event consumer
///
/// Answers 202 once the message is queued; routing happens asynchronously.
pub async fn ingest_event(
    State(state): State<AppState>,
    Path(topic): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let bus = state
        .events
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("event ingestion is not configured".to_string()))?;

    if EventSource::from_topic(&topic).is_none() {
        return Err(ApiError::NotFound(format!("Unknown topic {}", topic)));
    }

    let mut message = InboundMessage::new(topic.clone(), body.to_vec());
    if let Some(status) = headers.get(ORDER_STATUS_HEADER).and_then(|v| v.to_str().ok()) {
        message = message.with_header(ORDER_STATUS_HEADER, status);
    }

    bus.submit(message)
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;

    tracing::debug!(topic = %topic, "Event queued");
    Ok(StatusCode::ACCEPTED)
}
