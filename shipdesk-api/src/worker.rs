use std::sync::Arc;

use shipdesk_order::OrderManager;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

/// Periodic full refetch so listeners see writes made by other desks.
pub async fn start_refresh_worker(manager: Arc<OrderManager>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick fires immediately and startup already refreshed
    ticker.tick().await;

    info!("Refresh worker started, every {:?}", period);

    loop {
        ticker.tick().await;
        match manager.refresh().await {
            Ok(orders) => tracing::debug!("Background refresh saw {} orders", orders.len()),
            Err(e) => warn!("Background refresh failed: {}", e),
        }
    }
}
