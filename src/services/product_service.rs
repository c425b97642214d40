use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::api::{CreateProductRequest, UpdateProductRequest};
use crate::auth::Claims;
use crate::database::models::Product;
use crate::database::{Entity, EntityKey, EntityStore, EntityType, ScanFilter, StoreError};

use super::ServiceError;

const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Product catalogue. Reads are public; every mutation names the caller.
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn EntityStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, actor: &Claims, request: CreateProductRequest) -> Result<Product, ServiceError> {
        request.validate()?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            description: request.description,
            price: request.price,
            category: request.category.trim().to_string(),
            stock: request.stock,
            image_url: request.image_url,
            created_at: now,
            updated_at: now,
        };
        self.store.put(product.to_item()?).await?;

        info!(product_id = %product.id, actor = %actor.user_id, "Created product");
        Ok(product)
    }

    /// Every product, newest first.
    pub async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        let items = self.store.scan(&ScanFilter::of(EntityType::Product)).await?;
        let mut products = items
            .into_iter()
            .map(Product::from_item)
            .collect::<Result<Vec<_>, _>>()?;
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    pub async fn get(&self, id: &str) -> Result<Product, ServiceError> {
        match self.store.get(&Self::key(id)).await? {
            Some(item) => Ok(Product::from_item(item)?),
            None => Err(ServiceError::NotFound(PRODUCT_NOT_FOUND.to_string())),
        }
    }

    pub async fn update(
        &self,
        actor: &Claims,
        id: &str,
        request: UpdateProductRequest,
    ) -> Result<Product, ServiceError> {
        request.validate()?;

        let item = match self.store.update(&Self::key(id), request.into_fields()).await {
            Ok(item) => item,
            Err(StoreError::NotFound(_)) => {
                return Err(ServiceError::NotFound(PRODUCT_NOT_FOUND.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        info!(product_id = %id, actor = %actor.user_id, "Updated product");
        Ok(Product::from_item(item)?)
    }

    /// Removing a product that never existed is `NotFound`, not success.
    pub async fn delete(&self, actor: &Claims, id: &str) -> Result<(), ServiceError> {
        if !self.store.remove(&Self::key(id)).await? {
            return Err(ServiceError::NotFound(PRODUCT_NOT_FOUND.to_string()));
        }

        info!(product_id = %id, actor = %actor.user_id, "Deleted product");
        Ok(())
    }

    fn key(id: &str) -> EntityKey {
        EntityKey::new(id, EntityType::Product)
    }
}
