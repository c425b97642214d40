// handlers/public/system.rs - service descriptor, health, fallback

use axum::{extract::State, http::Uri};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

/// GET / - name, version and route map
pub async fn root() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/auth/register, /auth/login (public), /auth/me (bearer)",
            "products": "/products[/:id] (GET public; POST, PUT, DELETE bearer)",
            "orders": "/orders[/:id] (bearer, caller's own only)",
            "health": "/health (public)",
        }
    }))
}

/// GET /health - 200 when the store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => Ok(ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "store": "ok",
        }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("Store unavailable"))
        }
    }
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route not found: {}", uri.path()))
}
