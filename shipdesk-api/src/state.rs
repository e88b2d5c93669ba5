use std::sync::Arc;
use shipdesk_order::OrderManager;
use shipdesk_store::EventBus;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<OrderManager>,
    pub events: EventBus,
}
