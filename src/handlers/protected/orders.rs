// handlers/protected/orders.rs - POST|GET /orders, GET /orders/:id

use axum::extract::{Path, State};

use crate::api::{CreateOrderRequest, JsonBody};
use crate::database::models::Order;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

/// POST /orders - total is computed server-side, status starts `pending`
pub async fn create(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    JsonBody(request): JsonBody<CreateOrderRequest>,
) -> ApiResult<Order> {
    let order = state.orders.create(&claims, request).await?;
    Ok(ApiResponse::created(order))
}

/// GET /orders - the caller's orders only
pub async fn list(State(state): State<AppState>, AuthUser(claims): AuthUser) -> ApiResult<Vec<Order>> {
    let orders = state.orders.list(&claims).await?;
    Ok(ApiResponse::success(orders))
}

/// GET /orders/:id - 404 if absent, 401 if it belongs to someone else
pub async fn show(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Order> {
    let order = state.orders.get(&claims, &id).await?;
    Ok(ApiResponse::success(order))
}
