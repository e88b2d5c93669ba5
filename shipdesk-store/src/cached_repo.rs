use std::sync::Arc;

use async_trait::async_trait;
use shipdesk_order::repository::sort_newest_first;
use shipdesk_order::{Order, OrderRepository, StoreError};
use tokio::sync::RwLock;
use tracing::{error, warn};

/// Keeps the last good listing from the primary store. Reads fall back to
/// it while the primary is unavailable; writes never do, they fail so the
/// operator can retry.
pub struct CachedOrderRepository {
    primary: Arc<dyn OrderRepository>,
    snapshot: RwLock<Vec<Order>>,
}

impl CachedOrderRepository {
    pub fn new(primary: Arc<dyn OrderRepository>) -> Self {
        Self {
            primary,
            snapshot: RwLock::new(Vec::new()),
        }
    }

    pub async fn snapshot(&self) -> Vec<Order> {
        self.snapshot.read().await.clone()
    }

    async fn remember(&self, order: &Order) {
        let mut snapshot = self.snapshot.write().await;
        match snapshot.iter_mut().find(|o| o.id == order.id) {
            Some(existing) => *existing = order.clone(),
            None => {
                snapshot.push(order.clone());
                sort_newest_first(&mut snapshot);
            }
        }
    }
}

#[async_trait]
impl OrderRepository for CachedOrderRepository {
    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        match self.primary.list().await {
            Ok(orders) => {
                *self.snapshot.write().await = orders.clone();
                Ok(orders)
            }
            Err(StoreError::Unavailable(reason)) => {
                let snapshot = self.snapshot().await;
                warn!("Order store unavailable ({}), serving {} cached orders", reason, snapshot.len());
                Ok(snapshot)
            }
            Err(e) => Err(e),
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Order>, StoreError> {
        match self.primary.get(id).await {
            Err(StoreError::Unavailable(reason)) => {
                let cached = self.snapshot.read().await.iter().find(|o| o.id == id).cloned();
                match cached {
                    Some(order) => {
                        warn!("Order store unavailable ({}), reading {} from cache", reason, id);
                        Ok(Some(order))
                    }
                    // absent from the snapshot says nothing about the store
                    None => Err(StoreError::Unavailable(reason)),
                }
            }
            other => other,
        }
    }

    async fn upsert(&self, order: &Order) -> Result<Order, StoreError> {
        match self.primary.upsert(order).await {
            Ok(stored) => {
                self.remember(&stored).await;
                Ok(stored)
            }
            Err(e) => {
                error!("Failed to persist order {}: {}", order.id, e);
                Err(e)
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.primary.delete(id).await?;
        self.snapshot.write().await.retain(|o| o.id != id);
        Ok(())
    }
}
