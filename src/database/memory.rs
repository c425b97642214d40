use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::entity::{EntityKey, Item, ScanFilter};
use super::store::{EntityStore, StoreError};
use super::update::UpdateExpression;

/// In-process entity store. Each operation holds the lock for exactly one
/// key access, mirroring the per-key atomicity of the managed backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<EntityKey, Item>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn put(&self, item: Item) -> Result<(), StoreError> {
        let key = EntityKey::from_item(&item)?;
        self.items.write().await.insert(key, item);
        Ok(())
    }

    async fn insert(&self, item: Item) -> Result<(), StoreError> {
        let key = EntityKey::from_item(&item)?;
        let mut items = self.items.write().await;
        if items.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key));
        }
        items.insert(key, item);
        Ok(())
    }

    async fn get(&self, key: &EntityKey) -> Result<Option<Item>, StoreError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn apply_update(&self, key: &EntityKey, update: &UpdateExpression) -> Result<Item, StoreError> {
        let mut items = self.items.write().await;
        let item = items
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        update.apply(item);
        Ok(item.clone())
    }

    async fn remove(&self, key: &EntityKey) -> Result<bool, StoreError> {
        Ok(self.items.write().await.remove(key).is_some())
    }

    async fn scan(&self, filter: &ScanFilter) -> Result<Vec<Item>, StoreError> {
        let items = self.items.read().await;
        Ok(items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }
}
