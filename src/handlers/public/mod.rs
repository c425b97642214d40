// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, catalogue reads, and service metadata.
pub mod auth;
pub mod products;
pub mod system;
