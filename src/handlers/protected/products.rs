// handlers/protected/products.rs - POST /products, PUT|DELETE /products/:id

use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::api::{CreateProductRequest, JsonBody, UpdateProductRequest};
use crate::database::models::Product;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

/// POST /products
pub async fn create(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    JsonBody(request): JsonBody<CreateProductRequest>,
) -> ApiResult<Product> {
    let product = state.products.create(&claims, request).await?;
    Ok(ApiResponse::created(product))
}

/// PUT /products/:id - partial update
///
/// The body is taken raw so that `id`, `type`, `createdAt` and `updatedAt`
/// are reported by name instead of as unknown fields.
pub async fn update(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Product> {
    let request = UpdateProductRequest::from_value(body)?;
    let product = state.products.update(&claims, &id, request).await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /products/:id - 200 ack, or 404 if there was nothing to delete
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    state.products.delete(&claims, &id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
