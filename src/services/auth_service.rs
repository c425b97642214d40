use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::requests::normalize_email;
use crate::api::{LoginRequest, RegisterRequest};
use crate::auth::{self, AuthError, Claims, TokenService};
use crate::database::models::{PublicUser, User};

use super::{CredentialStore, ServiceError};

/// Same message for unknown email and wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const NO_TOKEN: &str = "No token provided";
pub const INVALID_TOKEN_FORMAT: &str = "Invalid token format";
pub const INVALID_TOKEN: &str = "Invalid or expired token";

/// Token plus the public view of the user it was issued to.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: PublicUser,
}

/// Registration, login and the bearer guard every protected route goes through.
#[derive(Clone)]
pub struct AuthService {
    credentials: CredentialStore,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(credentials: CredentialStore, tokens: TokenService) -> Self {
        Self { credentials, tokens }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession, ServiceError> {
        let request = request.normalized();
        request.validate()?;

        if self.credentials.find_by_email(&request.email).await?.is_some() {
            return Err(ServiceError::Conflict("User already exists".to_string()));
        }

        let password = request.password;
        let password_hash = run_blocking(move || auth::hash_password(&password)).await?;

        let user = User {
            email: request.email,
            user_id: Uuid::new_v4().to_string(),
            name: request.name,
            password_hash,
            created_at: Utc::now(),
        };
        // The insert is conditional, so a concurrent registration that slipped
        // past the check above still ends in Conflict.
        self.credentials.create(&user).await?;

        info!(user_id = %user.user_id, "Registered user");
        self.session_for(&user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession, ServiceError> {
        request.validate()?;
        let email = normalize_email(&request.email);

        let user = match self.credentials.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                info!("Login failed: unknown account");
                return Err(ServiceError::unauthenticated(INVALID_CREDENTIALS));
            }
        };

        let password = request.password;
        let hash = user.password_hash.clone();
        let matches = run_blocking(move || auth::verify_password(&password, &hash)).await?;
        if !matches {
            info!(user_id = %user.user_id, "Login failed: wrong password");
            return Err(ServiceError::unauthenticated(INVALID_CREDENTIALS));
        }

        self.session_for(&user)
    }

    /// Claims for a valid token, `None` otherwise. Never errors.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        self.tokens.verify(token)
    }

    /// Resolve the `Authorization: Bearer <token>` header to claims.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Claims, ServiceError> {
        let token = bearer_token(headers).map_err(ServiceError::unauthenticated)?;
        self.verify(token)
            .ok_or_else(|| ServiceError::unauthenticated(INVALID_TOKEN))
    }

    pub async fn current_user(&self, claims: &Claims) -> Result<PublicUser, ServiceError> {
        match self.credentials.find_by_email(&claims.email).await? {
            Some(user) if user.user_id == claims.user_id => Ok(user.public_view()),
            _ => {
                warn!(user_id = %claims.user_id, "Token subject has no matching user");
                Err(ServiceError::NotFound("User not found".to_string()))
            }
        }
    }

    fn session_for(&self, user: &User) -> Result<AuthSession, ServiceError> {
        let token = self.tokens.issue(&user.user_id, &user.email)?;
        Ok(AuthSession {
            token,
            user: user.public_view(),
        })
    }
}

/// The token of a strictly formatted `Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers.get(AUTHORIZATION).ok_or(NO_TOKEN)?;
    let value = value.to_str().map_err(|_| INVALID_TOKEN_FORMAT)?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() && !token.contains(' ') => Ok(token),
        _ => Err(INVALID_TOKEN_FORMAT),
    }
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::Join(e.to_string()))?
        .map_err(ServiceError::from)
}
