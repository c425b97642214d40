pub mod entity;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;
pub mod update;

pub use entity::{Entity, EntityKey, EntityType, Item, ScanFilter};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{EntityStore, StoreError};
pub use update::{UpdateBuilder, UpdateError, UpdateExpression};
