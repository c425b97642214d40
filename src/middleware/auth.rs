use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::server::AppState;

/// Authenticated caller, resolved from the `Authorization: Bearer` header.
///
/// Adding this extractor to a handler makes the route protected: a missing,
/// malformed, invalid or expired token is rejected with 401 before the
/// handler body runs.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = state.auth.authorize(&parts.headers).map_err(|e| {
            tracing::debug!(path = %parts.uri.path(), "Rejected request: {}", e);
            ApiError::from(e)
        })?;
        Ok(AuthUser(claims))
    }
}
