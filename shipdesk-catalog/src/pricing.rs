use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::zones::{Zone, ZoneLookup, ZoneTable};

/// Shipping companies the desk can hand an order to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Carrier {
    /// J&T: zone and weight based tariff, computed automatically
    Jt,
    /// Egypt Post: the operator enters the fee from the counter receipt
    Posta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    WeightTiered,
    ManualFee,
}

impl Carrier {
    pub fn pricing_model(&self) -> PricingModel {
        match self {
            Carrier::Jt => PricingModel::WeightTiered,
            Carrier::Posta => PricingModel::ManualFee,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Carrier::Jt => "JT",
            Carrier::Posta => "POSTA",
        }
    }

    /// Whether the operator's weight entry is used at all.
    pub fn uses_weight(&self) -> bool {
        self.pricing_model() == PricingModel::WeightTiered
    }
}

/// Tariff constants. Defaults match the rates the shipping team was quoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Weight covered by the zone base price
    pub base_weight_kg: Decimal,
    /// Orders below this value pay the flat surcharge, others the rate
    pub value_surcharge_threshold: Decimal,
    pub flat_value_surcharge: Decimal,
    pub value_surcharge_rate: Decimal,
    pub weight_tiered_default_profit: Decimal,
    pub manual_fee_default_profit: Decimal,
    pub manual_fee_default: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_weight_kg: dec!(1),
            value_surcharge_threshold: dec!(1000),
            flat_value_surcharge: dec!(5),
            value_surcharge_rate: dec!(0.01),
            weight_tiered_default_profit: dec!(20),
            manual_fee_default_profit: dec!(5),
            manual_fee_default: dec!(0),
        }
    }
}

/// How a shipping fee was put together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub carrier: Carrier,
    /// `None` for manual fees
    pub zone: Option<Zone>,
    pub base_price: Decimal,
    pub extra_weight_kg: Decimal,
    pub extra_weight_charge: Decimal,
    pub value_surcharge: Decimal,
    pub total: Decimal,
}

impl FeeBreakdown {
    pub fn manual(carrier: Carrier, fee: Decimal) -> Self {
        Self {
            carrier,
            zone: None,
            base_price: fee,
            extra_weight_kg: Decimal::ZERO,
            extra_weight_charge: Decimal::ZERO,
            value_surcharge: Decimal::ZERO,
            total: fee,
        }
    }
}

/// Computes carrier fees against an injected zone table.
#[derive(Clone)]
pub struct ShippingPricer {
    zones: Arc<dyn ZoneLookup>,
    config: PricingConfig,
}

impl ShippingPricer {
    pub fn new(zones: Arc<dyn ZoneLookup>, config: PricingConfig) -> Self {
        Self { zones, config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn zone_for(&self, city: &str) -> Zone {
        self.zones.zone_for(city)
    }

    pub fn default_profit(&self, carrier: Carrier) -> Decimal {
        match carrier.pricing_model() {
            PricingModel::WeightTiered => self.config.weight_tiered_default_profit,
            PricingModel::ManualFee => self.config.manual_fee_default_profit,
        }
    }

    /// Insurance-style surcharge on the declared product value.
    pub fn value_surcharge(&self, order_value: Decimal) -> Decimal {
        if order_value < self.config.value_surcharge_threshold {
            self.config.flat_value_surcharge
        } else {
            order_value * self.config.value_surcharge_rate
        }
    }

    /// Zone base + per-kg charge above the base weight + value surcharge.
    pub fn weight_tiered_fee(&self, city: &str, weight: Decimal, order_value: Decimal) -> FeeBreakdown {
        let zone = self.zones.zone_for(city);
        let extra_weight_kg = (weight - self.config.base_weight_kg).max(Decimal::ZERO);
        let extra_weight_charge = extra_weight_kg * zone.extra_per_kg;
        let value_surcharge = self.value_surcharge(order_value);
        let total = zone.base_price + extra_weight_charge + value_surcharge;

        debug!(
            "Weight-tiered fee for {:?} ({} kg, value {}): {} + {} + {} = {}",
            city.trim(), weight, order_value, zone.base_price, extra_weight_charge, value_surcharge, total
        );

        FeeBreakdown {
            carrier: Carrier::Jt,
            zone: Some(zone),
            base_price: zone.base_price,
            extra_weight_kg,
            extra_weight_charge,
            value_surcharge,
            total,
        }
    }
}

impl Default for ShippingPricer {
    fn default() -> Self {
        Self::new(Arc::new(ZoneTable::egypt()), PricingConfig::default())
    }
}
