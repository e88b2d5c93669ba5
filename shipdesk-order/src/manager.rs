use std::sync::Arc;

use shipdesk_catalog::{Carrier, ShippingPricer};
use shipdesk_core::input::ensure_amount;
use shipdesk_core::{ids, CoreError};
use shipdesk_shared::{OrderEvent, OrderEventKind};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::dispatch::{apply_dispatch, DispatchParams, DispatchRequest};
use crate::draft::DispatchDraft;
use crate::filter::OrderFilter;
use crate::models::{NewOrder, Order, OrderUpdate, ShippingCompany, ShippingStatus};
use crate::repository::{OrderRepository, StoreError};

/// Order lifecycle on top of an [`OrderRepository`]: creation, edits,
/// dispatch and shipping status. Every write is a single read-modify-write
/// of one record followed by a full refetch.
pub struct OrderManager {
    repo: Arc<dyn OrderRepository>,
    pricer: Arc<ShippingPricer>,
    events: Option<broadcast::Sender<OrderEvent>>,
}

impl OrderManager {
    pub fn new(repo: Arc<dyn OrderRepository>, pricer: Arc<ShippingPricer>) -> Self {
        Self {
            repo,
            pricer,
            events: None,
        }
    }

    pub fn with_events(mut self, events: broadcast::Sender<OrderEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn pricer(&self) -> &ShippingPricer {
        &self.pricer
    }

    /// Create a new order in the shipping queue
    pub async fn create_order(&self, new: NewOrder) -> Result<Order, OrderError> {
        for (field, value) in [
            ("customer_name", &new.customer_name),
            ("customer_phone", &new.customer_phone),
            ("city", &new.city),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::MissingField(field.to_string()).into());
            }
        }
        ensure_amount("total_amount", new.total_amount)?;
        ensure_amount("paid", new.paid)?;

        let order = Order::new(ids::new_order_id(), new, self.pricer.default_profit(Carrier::Jt));
        let order = self.repo.upsert(&order).await?;
        info!("Created order {} for {} ({})", order.id, order.sales_username, order.city);

        self.publish(OrderEvent::for_order(&order.id, OrderEventKind::Created));
        self.refresh_after_write().await;
        Ok(order)
    }

    /// Get an order by ID
    pub async fn get_order(&self, order_id: &str) -> Result<Order, OrderError> {
        self.repo
            .get(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))
    }

    pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, OrderError> {
        let orders = self.repo.list().await?;
        Ok(orders.into_iter().filter(|o| filter.matches(o)).collect())
    }

    pub async fn update_order(&self, order_id: &str, update: OrderUpdate) -> Result<Order, OrderError> {
        if let Some(total) = update.total_amount {
            ensure_amount("total_amount", total)?;
        }
        if let Some(paid) = update.paid {
            ensure_amount("paid", paid)?;
        }

        let mut order = self.get_order(order_id).await?;
        update.apply(&mut order);
        let order = self.repo.upsert(&order).await?;
        info!("Updated order {} (remaining now {})", order.id, order.remaining());

        self.publish(OrderEvent::for_order(&order.id, OrderEventKind::Updated));
        self.refresh_after_write().await;
        Ok(order)
    }

    pub async fn delete_order(&self, order_id: &str) -> Result<(), OrderError> {
        self.repo.delete(order_id).await?;
        info!("Deleted order {}", order_id);

        self.publish(OrderEvent::for_order(order_id, OrderEventKind::Deleted));
        self.refresh_after_write().await;
        Ok(())
    }

    /// Fresh pending-edit state for an order in the shipping queue.
    pub async fn draft(&self, order_id: &str) -> Result<DispatchDraft, OrderError> {
        let order = self.get_order(order_id).await?;
        Ok(DispatchDraft::for_order(&order, &self.pricer))
    }

    /// Assign a carrier and fix fee/profit. `ShippingCompany::None` is
    /// rejected before the store is touched.
    pub async fn dispatch(
        &self,
        order_id: &str,
        company: ShippingCompany,
        params: DispatchParams,
    ) -> Result<Order, OrderError> {
        if !company.is_assigned() {
            return Err(CoreError::MissingCarrier.into());
        }

        let order = self.get_order(order_id).await?;
        let request = DispatchRequest::resolve(company, &params, order.weight, &self.pricer)?;
        self.dispatch_loaded(order, request).await
    }

    /// Same as [`OrderManager::dispatch`] for a request built from a
    /// confirmed draft.
    pub async fn dispatch_request(&self, order_id: &str, request: DispatchRequest) -> Result<Order, OrderError> {
        let order = self.get_order(order_id).await?;
        self.dispatch_loaded(order, request).await
    }

    async fn dispatch_loaded(&self, mut order: Order, request: DispatchRequest) -> Result<Order, OrderError> {
        let fee = apply_dispatch(&mut order, &request, &self.pricer)?;

        // no rollback: a failed write leaves the stored record as it was
        let order = self.repo.upsert(&order).await?;
        info!(
            "Dispatched order {} via {}: fee {} + profit {}, remaining {}",
            order.id,
            order.shipping_company.code(),
            fee.total,
            order.shipping_profit,
            order.remaining()
        );

        self.publish(OrderEvent::for_order(
            &order.id,
            OrderEventKind::Dispatched { shipping_company: order.shipping_company.code().to_string() },
        ));
        self.refresh_after_write().await;
        Ok(order)
    }

    /// Any status can follow any other; the shipping team corrects mistakes
    /// by simply picking the right one.
    pub async fn set_status(&self, order_id: &str, status: ShippingStatus) -> Result<Order, OrderError> {
        let mut order = self.get_order(order_id).await?;
        let previous = order.shipping_status;
        order.update_shipping_status(status);

        let order = self.repo.upsert(&order).await?;
        info!("Order {} shipping status {} -> {}", order.id, previous.as_str(), status.as_str());

        self.publish(OrderEvent::for_order(
            &order.id,
            OrderEventKind::StatusChanged { shipping_status: status.as_str().to_string() },
        ));
        self.refresh_after_write().await;
        Ok(order)
    }

    /// Full refetch from the store.
    pub async fn refresh(&self) -> Result<Vec<Order>, OrderError> {
        let orders = self.repo.list().await?;
        debug!("Refreshed {} orders", orders.len());
        self.publish(OrderEvent::new(None, OrderEventKind::Refreshed { order_count: orders.len() }));
        Ok(orders)
    }

    async fn refresh_after_write(&self) {
        // the write already succeeded; a failed reload only delays listeners
        if let Err(e) = self.refresh().await {
            warn!("Reload after write failed: {}", e);
        }
    }

    fn publish(&self, event: OrderEvent) {
        if let Some(tx) = &self.events {
            // no subscribers is fine
            let _ = tx.send(event);
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Order {0} has already been dispatched")]
    AlreadyDispatched(String),

    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => OrderError::NotFound(id),
            other => OrderError::Store(other),
        }
    }
}
