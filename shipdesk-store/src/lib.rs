pub mod app_config;
pub mod database;
pub mod order_repo;
pub mod cached_repo;
pub mod events;

pub use database::DbClient;
pub use order_repo::PgOrderRepository;
pub use cached_repo::CachedOrderRepository;
pub use events::EventBus;
