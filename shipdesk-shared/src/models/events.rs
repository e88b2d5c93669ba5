use chrono::Utc;
use uuid::Uuid;

/// What happened to the order book.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum OrderEventKind {
    Created,
    Updated,
    Deleted,
    Dispatched {
        shipping_company: String,
    },
    StatusChanged {
        shipping_status: String,
    },
    /// Full refetch from the store finished.
    Refreshed {
        order_count: usize,
    },
}

/// Broadcast after every successful write so listeners can refetch.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OrderEvent {
    pub event_id: Uuid,
    pub order_id: Option<String>,
    #[serde(flatten)]
    pub kind: OrderEventKind,
    pub timestamp: i64,
}

impl OrderEvent {
    pub fn new(order_id: Option<String>, kind: OrderEventKind) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            order_id,
            kind,
            timestamp: Utc::now().timestamp(),
        }
    }

    pub fn for_order(order_id: &str, kind: OrderEventKind) -> Self {
        Self::new(Some(order_id.to_string()), kind)
    }

    /// Name used as the SSE `event:` field.
    pub fn name(&self) -> &'static str {
        match self.kind {
            OrderEventKind::Created => "order_created",
            OrderEventKind::Updated => "order_updated",
            OrderEventKind::Deleted => "order_deleted",
            OrderEventKind::Dispatched { .. } => "order_dispatched",
            OrderEventKind::StatusChanged { .. } => "shipping_status_changed",
            OrderEventKind::Refreshed { .. } => "orders_refreshed",
        }
    }
}
