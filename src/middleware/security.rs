//! Security and CORS headers for every response.
//!
//! Origins are matched against an allow-list. An unrecognized origin gets the
//! first allowed origin back, which a browser will then refuse to match.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
            CACHE_CONTROL, CONTENT_TYPE, ORIGIN, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY, VARY,
            X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::SecurityConfig;
use crate::error::{ApiError, PAYLOAD_TOO_LARGE_MESSAGE};

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";
const PREFLIGHT_MAX_AGE: &str = "600";

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
    hsts: HeaderValue,
}

impl CorsPolicy {
    pub fn new(allowed_origins: Vec<String>, hsts_max_age: u64) -> Self {
        let hsts = format!("max-age={}; includeSubDomains", hsts_max_age);
        Self {
            allowed_origins,
            hsts: HeaderValue::from_str(&hsts)
                .unwrap_or_else(|_| HeaderValue::from_static("max-age=31536000; includeSubDomains")),
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(security.cors_origins.clone(), security.hsts_max_age)
    }

    /// The origin to echo: the request's own when allowed, else the safe default.
    pub fn allowed_origin<'a>(&'a self, origin: Option<&'a str>) -> Option<&'a str> {
        match origin {
            Some(origin) if self.allowed_origins.iter().any(|allowed| allowed == origin) => Some(origin),
            _ => self.allowed_origins.first().map(String::as_str),
        }
    }

    pub fn apply(&self, headers: &mut HeaderMap, origin: Option<&str>) {
        // Prevent clickjacking
        headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

        // Prevent MIME sniffing
        headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));

        headers.insert(STRICT_TRANSPORT_SECURITY, self.hsts.clone());
        headers.insert(REFERRER_POLICY, HeaderValue::from_static("strict-origin-when-cross-origin"));

        // API responses carry tokens and personal data
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

        if let Some(value) = self
            .allowed_origin(origin)
            .and_then(|allowed| HeaderValue::from_str(allowed).ok())
        {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
            headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        }
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS));
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(PREFLIGHT_MAX_AGE));
        headers.insert(VARY, HeaderValue::from_static("Origin"));
    }
}

/// Answers preflight requests itself and decorates every other response.
/// The body limit layer's plain-text 413 is rewritten into the error envelope.
pub async fn security_headers_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json(response.headers()) {
        response = ApiError::payload_too_large(PAYLOAD_TOO_LARGE_MESSAGE).into_response();
    }

    policy.apply(response.headers_mut(), origin.as_deref());
    response
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}
