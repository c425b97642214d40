//! Domain services. Each takes its collaborators at construction and returns
//! a typed `ServiceError` the HTTP layer maps onto status codes.

use thiserror::Error;

use crate::api::ValidationError;
use crate::auth::AuthError;
use crate::database::StoreError;

pub mod auth_service;
pub mod credentials;
pub mod order_service;
pub mod product_service;

pub use auth_service::{AuthService, AuthSession};
pub use credentials::CredentialStore;
pub use order_service::OrderService;
pub use product_service::ProductService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Valid caller, wrong owner.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ServiceError::Unauthenticated(message.into())
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}
