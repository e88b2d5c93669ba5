use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use shipdesk_api::{app, worker, AppState};
use shipdesk_catalog::ShippingPricer;
use shipdesk_order::{InMemoryOrderRepository, OrderManager, OrderRepository};
use shipdesk_store::app_config::{Config, StoreBackend};
use shipdesk_store::{CachedOrderRepository, DbClient, EventBus, PgOrderRepository};
use tokio::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "shipdesk_api=debug,shipdesk_order=info,shipdesk_store=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Shipdesk API on port {}", config.server.port);

    let primary: Arc<dyn OrderRepository> = match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory order store; orders are lost on restart");
            Arc::new(InMemoryOrderRepository::new())
        }
        StoreBackend::Postgres => {
            let db_config = config
                .database
                .as_ref()
                .context("store.backend = \"postgres\" needs a [database] section")?;
            let db = DbClient::new(db_config)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            Arc::new(PgOrderRepository::new(db.pool.clone()))
        }
    };
    let repo = Arc::new(CachedOrderRepository::new(primary));

    let pricer = Arc::new(ShippingPricer::new(
        Arc::new(config.zone_table()),
        config.pricing.clone(),
    ));
    let events = EventBus::new(config.store.event_buffer);
    let manager = Arc::new(OrderManager::new(repo, pricer).with_events(events.sender()));

    match manager.refresh().await {
        Ok(orders) => tracing::info!("Loaded {} orders", orders.len()),
        Err(e) => tracing::warn!("Initial order load failed: {}", e),
    }

    if config.store.refresh_interval_seconds > 0 {
        tokio::spawn(worker::start_refresh_worker(
            manager.clone(),
            Duration::from_secs(config.store.refresh_interval_seconds),
        ));
    }

    let app = app(AppState { manager, events });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
