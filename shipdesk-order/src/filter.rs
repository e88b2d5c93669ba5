use serde::Deserialize;

use crate::models::{Order, ShippingStatus};

/// Split of the shipping desk's worklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingQueue {
    /// No carrier yet
    Pending,
    /// Carrier assigned
    Assigned,
}

/// Listing filters. Empty filter matches everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    /// Case-insensitive match on customer name, phone, city or order id
    pub search: Option<String>,
    pub shipping_status: Option<ShippingStatus>,
    pub sales_username: Option<String>,
    pub queue: Option<ShippingQueue>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        self.matches_search(order)
            && self.shipping_status.map_or(true, |s| order.shipping_status == s)
            && self.sales_username.as_deref().map_or(true, |u| order.sales_username == u)
            && self.queue.map_or(true, |q| match q {
                ShippingQueue::Pending => !order.is_dispatched(),
                ShippingQueue::Assigned => order.is_dispatched(),
            })
    }

    fn matches_search(&self, order: &Order) -> bool {
        let needle = match self.search.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ => return true,
        };

        [
            order.customer_name.as_str(),
            order.customer_phone.expose().as_str(),
            order.city.as_str(),
            order.id.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}
