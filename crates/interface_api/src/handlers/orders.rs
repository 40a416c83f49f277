//! Order handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use core_kernel::OrderId;

use crate::dto::order::{CreateOrderRequest, CreateOrderResponse, OrderResponse};
use crate::{error::ApiError, AppState};

fn parse_id(raw: &str) -> Result<OrderId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid order id {}", raw)))
}

/// Creates an order in RECEIVED
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), ApiError> {
    let new_order = request.into_new_order()?;
    let order = state.service.create_order(new_order).await?;
    let id = order
        .id()
        .ok_or_else(|| ApiError::Internal("saved order has no id".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            id,
            timestamp: order.created_at(),
        }),
    ))
}

/// Gets an order by ID
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.service.get_order(parse_id(&id)?).await?;
    Ok(Json(order.into()))
}

/// Lists a customer's orders; 204 when there are none
pub async fn list_customer_orders(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Response, ApiError> {
    let orders = state.service.list_orders_by_customer(&customer_id).await?;
    if orders.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(Json(body).into_response())
}

/// Cancels an order
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.service.cancel_order(parse_id(&id)?).await?;
    Ok(Json(order.into()))
}
