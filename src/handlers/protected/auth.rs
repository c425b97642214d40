// handlers/protected/auth.rs - GET /auth/me

use axum::extract::State;

use crate::database::models::PublicUser;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

/// GET /auth/me - public view of the token's user
pub async fn me(State(state): State<AppState>, AuthUser(claims): AuthUser) -> ApiResult<PublicUser> {
    let user = state.auth.current_user(&claims).await?;
    Ok(ApiResponse::success(user))
}
