// handlers/public/auth.rs - POST /auth/register, POST /auth/login

use axum::extract::State;

use crate::api::{JsonBody, LoginRequest, RegisterRequest};
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;
use crate::services::AuthSession;

/// POST /auth/register - create an account and receive a token
///
/// Body: `{email, password, name}`. Answers 201 `{token, user}`; a taken
/// email answers 409.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> ApiResult<AuthSession> {
    let session = state.auth.register(request).await?;
    Ok(ApiResponse::created(session))
}

/// POST /auth/login - exchange credentials for a token
///
/// Unknown email and wrong password both answer 401 "Invalid credentials".
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<AuthSession> {
    let session = state.auth.login(request).await?;
    Ok(ApiResponse::success(session))
}
