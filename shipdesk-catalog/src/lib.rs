pub mod zones;
pub mod pricing;

pub use zones::{Zone, ZoneLookup, ZoneTable, ZoneTier};
pub use pricing::{Carrier, FeeBreakdown, PricingConfig, PricingModel, ShippingPricer};
