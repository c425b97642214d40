use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;

use super::entity::{EntityKey, Item, ScanFilter};
use super::update::{UpdateBuilder, UpdateError, UpdateExpression};

/// Errors from an `EntityStore`
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(EntityKey),

    #[error("Already exists: {0}")]
    AlreadyExists(EntityKey),

    #[error("Record is missing key field '{0}'")]
    MissingKey(&'static str),

    #[error(transparent)]
    Update(#[from] UpdateError),

    #[error("Missing configuration: {0}")]
    NotConfigured(&'static str),

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Single-table access keyed by `(id, type)`.
///
/// Every operation touches exactly one key, except `scan`. Atomicity is per
/// key and is whatever the backend gives a single write.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Upsert the whole record.
    async fn put(&self, item: Item) -> Result<(), StoreError>;

    /// Conditional write: fails with `AlreadyExists` if the key is taken.
    async fn insert(&self, item: Item) -> Result<(), StoreError>;

    async fn get(&self, key: &EntityKey) -> Result<Option<Item>, StoreError>;

    /// Apply a built expression to an existing record and return the result.
    /// Fails with `NotFound` if the key does not exist.
    async fn apply_update(&self, key: &EntityKey, update: &UpdateExpression) -> Result<Item, StoreError>;

    /// Delete by key. Returns whether a record was present; absence is not an error.
    async fn remove(&self, key: &EntityKey) -> Result<bool, StoreError>;

    /// All records matching `filter`, as one unpaginated page.
    async fn scan(&self, filter: &ScanFilter) -> Result<Vec<Item>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Merge `fields` into the record at `key`, stamping `updatedAt`.
    async fn update(&self, key: &EntityKey, fields: Map<String, Value>) -> Result<Item, StoreError> {
        let expression = UpdateBuilder::from_fields(fields)?.build(Utc::now());
        tracing::debug!(key = %key, expression = expression.expression(), "applying update");
        self.apply_update(key, &expression).await
    }
}
