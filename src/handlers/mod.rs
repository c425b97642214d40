// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token required). A protected handler
// takes an `AuthUser` argument; the extractor rejects the request with 401
// before the handler body runs.
pub mod public;
pub mod protected;
