// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::api::ValidationError;
use crate::middleware::response::{build_response, Payload};
use crate::services::ServiceError;

/// Message for bodies over the configured size limit.
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Request body too large";

/// Message returned for every failure whose detail stays server-side.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized (also used for wrong-owner access)
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Extra envelope fields beyond `success` and `error`
    pub fn details(&self) -> Value {
        match self {
            ApiError::ValidationError {
                field_errors: Some(field_errors),
                ..
            } => json!({ "code": self.error_code(), "field_errors": field_errors }),
            _ => json!({ "code": self.error_code() }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => {
                let field_errors = (!e.field_errors.is_empty()).then_some(e.field_errors);
                ApiError::validation_error(e.message, field_errors)
            }
            ServiceError::Unauthenticated(msg) => ApiError::unauthorized(msg),
            // Wrong owner looks exactly like a failed authentication to the caller
            ServiceError::Forbidden(msg) => ApiError::unauthorized(msg),
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::Store(store_err) => {
                // Log the real error but return generic message
                tracing::error!("Store error: {}", store_err);
                ApiError::internal_server_error(INTERNAL_ERROR_MESSAGE)
            }
            ServiceError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ApiError::internal_server_error(INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::from(ServiceError::Validation(err))
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let payload = Payload::Error {
            message: self.message().to_string(),
            details: self.details(),
        };
        build_response(self.status_code(), payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StoreError;

    #[test]
    fn service_errors_map_to_taxonomy_statuses() {
        let cases = [
            (ServiceError::Validation(ValidationError::field("price", "bad")), StatusCode::BAD_REQUEST),
            (ServiceError::Unauthenticated("x".into()), StatusCode::UNAUTHORIZED),
            (ServiceError::Forbidden("x".into()), StatusCode::UNAUTHORIZED),
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::Conflict("x".into()), StatusCode::CONFLICT),
            (ServiceError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn internal_detail_is_never_echoed() {
        let err = ApiError::from(ServiceError::Store(StoreError::Corrupt(
            "connection to db-primary:5432 refused".to_string(),
        )));
        assert_eq!(err.message(), INTERNAL_ERROR_MESSAGE);

        let err = ApiError::from(ServiceError::Internal("argon2 exploded".to_string()));
        assert_eq!(err.message(), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn validation_details_carry_field_errors() {
        let err = ApiError::from(ServiceError::Validation(ValidationError::field("stock", "must be >= 0")));
        let details = err.details();
        assert_eq!(details["code"], "VALIDATION_ERROR");
        assert_eq!(details["field_errors"]["stock"], "must be >= 0");
    }
}
