use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, PAYLOAD_TOO_LARGE_MESSAGE};
use crate::redact::redact;

/// JSON body extractor whose rejections use the API error envelope.
///
/// Malformed JSON answers `INVALID_JSON`; well-formed JSON of the wrong shape
/// (missing field, wrong type, unknown field) answers `VALIDATION_ERROR`.
/// A body over the size limit answers `PAYLOAD_TOO_LARGE`.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                // A streamed body that trips the size limit surfaces here
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    ApiError::payload_too_large(PAYLOAD_TOO_LARGE_MESSAGE)
                } else {
                    ApiError::invalid_json(rejection.body_text())
                }
            })?;

        tracing::debug!(body = %redact(&value), "request body");

        serde_json::from_value(value)
            .map(JsonBody)
            .map_err(|e| ApiError::validation_error(shape_error_message(&e), None))
    }
}

/// Error kinds whose serde message quotes the rejected input.
const VALUE_ECHOING_KINDS: &[&str] = &["invalid type", "invalid value", "invalid length", "unknown variant"];

/// Describe a body of the wrong shape without repeating any submitted value.
///
/// Field names are kept, since they come from the request type. Values are
/// dropped because a mistyped `password` would otherwise be sent back verbatim.
pub fn shape_error_message(err: &serde_json::Error) -> String {
    let text = err.to_string();
    if ["missing field", "unknown field", "duplicate field"]
        .iter()
        .any(|prefix| text.starts_with(prefix))
    {
        return text;
    }

    match VALUE_ECHOING_KINDS.iter().find(|kind| text.starts_with(**kind)) {
        Some(kind) => match text.split_once(", expected ") {
            Some((_, expected)) => format!("{}, expected {}", kind, expected),
            None => kind.to_string(),
        },
        None => "request body has the wrong shape".to_string(),
    }
}
