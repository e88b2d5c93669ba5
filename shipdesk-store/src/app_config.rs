use serde::Deserialize;
use shipdesk_catalog::{PricingConfig, Zone, ZoneTable, ZoneTier};
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub pricing: PricingConfig,
    /// Replaces the built-in governorate tiers when present
    pub zones: Option<ZonesConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Period of the background full refetch, 0 disables it
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_refresh_interval() -> u64 { 30 }
fn default_event_buffer() -> usize { 100 }

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct ZonesConfig {
    pub tiers: Vec<ZoneTier>,
    pub fallback: Zone,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // optional per-environment overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `SHIPDESK__SERVER__PORT=8080`
            .add_source(config::Environment::with_prefix("SHIPDESK").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn zone_table(&self) -> ZoneTable {
        match &self.zones {
            Some(zones) => ZoneTable::new(zones.tiers.clone(), zones.fallback),
            None => ZoneTable::egypt(),
        }
    }
}
