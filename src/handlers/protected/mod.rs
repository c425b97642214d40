// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every handler here takes `AuthUser`, so the token is verified before any
// body parsing or store access happens.
pub mod auth;
pub mod orders;
pub mod products;
