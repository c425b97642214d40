pub mod auth;
pub mod response;
pub mod security;

pub use auth::AuthUser;
pub use response::{build_response, ApiResponse, ApiResult, Payload};
pub use security::{security_headers_middleware, CorsPolicy};
