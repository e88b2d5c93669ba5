use shipdesk_shared::OrderEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// In-process fan-out of order events to SSE clients and workers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<OrderEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn sender(&self) -> broadcast::Sender<OrderEvent> {
        self.sender.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        debug!("New order event subscriber ({} total)", self.sender.receiver_count() + 1);
        self.sender.subscribe()
    }

    /// Returns how many subscribers saw the event.
    pub fn publish(&self, event: OrderEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}
