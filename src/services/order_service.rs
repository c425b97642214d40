use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::CreateOrderRequest;
use crate::auth::Claims;
use crate::database::models::{Order, OrderStatus};
use crate::database::{Entity, EntityKey, EntityStore, EntityType, ScanFilter};

use super::ServiceError;

/// Stored attribute holding an order's owner.
const OWNER_FIELD: &str = "userId";

/// Orders scoped to the caller that placed them.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn EntityStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Item prices are taken as submitted; the total is always recomputed here.
    pub async fn create(&self, caller: &Claims, request: CreateOrderRequest) -> Result<Order, ServiceError> {
        request.validate()?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            user_id: caller.user_id.clone(),
            user_email: caller.email.clone(),
            total_amount: Order::total_of(&request.items),
            items: request.items,
            shipping_address: request.shipping_address,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.store.put(order.to_item()?).await?;

        info!(order_id = %order.id, user_id = %order.user_id, total = order.total_amount, "Created order");
        Ok(order)
    }

    /// The caller's orders, newest first.
    pub async fn list(&self, caller: &Claims) -> Result<Vec<Order>, ServiceError> {
        let filter = ScanFilter::of(EntityType::Order).owned_by(OWNER_FIELD, caller.user_id.as_str());
        let items = self.store.scan(&filter).await?;
        let mut orders = items
            .into_iter()
            .map(Order::from_item)
            .collect::<Result<Vec<_>, _>>()?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Someone else's order is `Forbidden`, which the caller sees as 401.
    pub async fn get(&self, caller: &Claims, id: &str) -> Result<Order, ServiceError> {
        let key = EntityKey::new(id, EntityType::Order);
        let order = match self.store.get(&key).await? {
            Some(item) => Order::from_item(item)?,
            None => return Err(ServiceError::NotFound("Order not found".to_string())),
        };

        if !order.is_owned_by(&caller.user_id) {
            warn!(order_id = %id, caller = %caller.user_id, "Order requested by non-owner");
            return Err(ServiceError::Forbidden("Unauthorized".to_string()));
        }
        Ok(order)
    }
}
