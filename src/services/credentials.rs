use std::sync::Arc;

use crate::database::models::User;
use crate::database::{Entity, EntityKey, EntityStore, EntityType, StoreError};

use super::ServiceError;

/// User records in the entity store, keyed by email.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn EntityStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let key = EntityKey::new(email, EntityType::User);
        match self.store.get(&key).await? {
            Some(item) => Ok(Some(User::from_item(item)?)),
            None => Ok(None),
        }
    }

    /// Conditional write: a second registration for the same email loses
    /// with `Conflict` even when both passed an earlier existence check.
    pub async fn create(&self, user: &User) -> Result<(), ServiceError> {
        match self.store.insert(user.to_item()?).await {
            Ok(()) => Ok(()),
            Err(StoreError::AlreadyExists(_)) => {
                Err(ServiceError::Conflict("User already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
