// handlers/public/products.rs - GET /products, GET /products/:id

use axum::extract::{Path, State};

use crate::database::models::Product;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

/// GET /products - full catalogue, newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let products = state.products.list().await?;
    Ok(ApiResponse::success(products))
}

/// GET /products/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Product> {
    let product = state.products.get(&id).await?;
    Ok(ApiResponse::success(product))
}
