use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::Order;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Order {id} was modified concurrently (expected version {expected}, found {found})")]
    VersionConflict {
        id: String,
        expected: i64,
        found: i64,
    },

    #[error("Order store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence contract for order records.
///
/// Writes replace the whole record. `upsert` takes the order carrying the
/// version the caller read (0 for a new order) and rejects it if the stored
/// copy has moved on since; the returned order carries the new version.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Order>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Order>, StoreError>;

    async fn upsert(&self, order: &Order) -> Result<Order, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Newest first, ties broken by id so listings are stable.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

/// Process-local store, used for development and tests.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<String, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self.orders.read().await.values().cloned().collect();
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    async fn get(&self, id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn upsert(&self, order: &Order) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;

        match orders.get(&order.id) {
            Some(existing) if existing.version != order.version => {
                return Err(StoreError::VersionConflict {
                    id: order.id.clone(),
                    expected: order.version,
                    found: existing.version,
                });
            }
            // deleted underneath the caller
            None if order.version != 0 => return Err(StoreError::NotFound(order.id.clone())),
            _ => {}
        }

        let mut stored = order.clone();
        stored.version += 1;
        orders.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.orders
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
