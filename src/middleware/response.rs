use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::INTERNAL_ERROR_MESSAGE;

/// Body of a response before it is wrapped in the envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `{success: true, data}`
    Data(Value),
    /// `{success: false, error, ...details}`; `details` must be an object to be merged.
    Error { message: String, details: Value },
}

impl Payload {
    pub fn error(message: impl Into<String>) -> Self {
        Payload::Error {
            message: message.into(),
            details: Value::Null,
        }
    }

    /// The JSON envelope for this payload.
    pub fn envelope(self) -> Value {
        match self {
            Payload::Data(data) => json!({ "success": true, "data": data }),
            Payload::Error { message, details } => {
                let mut envelope = Map::new();
                envelope.insert("success".to_string(), Value::Bool(false));
                envelope.insert("error".to_string(), Value::String(message));
                if let Value::Object(details) = details {
                    for (key, value) in details {
                        // The two envelope keys always win.
                        if key != "success" && key != "error" {
                            envelope.insert(key, value);
                        }
                    }
                }
                Value::Object(envelope)
            }
        }
    }
}

/// Map a status and payload to a JSON response. Security and CORS headers
/// are added by the router-wide middleware, so every response gets them.
pub fn build_response(status: StatusCode, payload: Payload) -> Response {
    // 204 No Content carries no body
    if status == StatusCode::NO_CONTENT {
        return status.into_response();
    }
    (status, Json(payload.envelope())).into_response()
}

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None, // Default to 200 OK
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return build_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Payload::error(INTERNAL_ERROR_MESSAGE),
                );
            }
        };

        build_response(status, Payload::Data(data))
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
