use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Flat price for the first kilogram plus the rate for every kilogram after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub base_price: Decimal,
    pub extra_per_kg: Decimal,
}

impl Zone {
    pub const fn new(base_price: Decimal, extra_per_kg: Decimal) -> Self {
        Self { base_price, extra_per_kg }
    }
}

/// A named group of governorates sharing one [`Zone`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneTier {
    pub name: String,
    pub cities: Vec<String>,
    pub base_price: Decimal,
    pub extra_per_kg: Decimal,
}

impl ZoneTier {
    pub fn new(name: &str, cities: &[&str], zone: Zone) -> Self {
        Self {
            name: name.to_string(),
            cities: cities.iter().map(|c| c.to_string()).collect(),
            base_price: zone.base_price,
            extra_per_kg: zone.extra_per_kg,
        }
    }

    pub fn zone(&self) -> Zone {
        Zone::new(self.base_price, self.extra_per_kg)
    }
}

/// City -> zone pricing. Implementations must be total: a city they do not
/// know still gets a zone.
pub trait ZoneLookup: Send + Sync {
    fn zone_for(&self, city: &str) -> Zone;
}

/// Lookup table built from tier lists. Cities match by exact string after
/// trimming, so two spellings of one governorate are two different keys.
#[derive(Debug, Clone)]
pub struct ZoneTable {
    tiers: Vec<ZoneTier>,
    fallback: Zone,
    index: HashMap<String, Zone>,
}

pub const REMOTE_ZONE: Zone = Zone::new(dec!(100), dec!(15));

impl ZoneTable {
    pub fn new(tiers: Vec<ZoneTier>, fallback: Zone) -> Self {
        let mut index = HashMap::new();
        for tier in &tiers {
            for city in &tier.cities {
                // first listing wins
                index.entry(city.trim().to_string()).or_insert_with(|| tier.zone());
            }
        }

        Self { tiers, fallback, index }
    }

    /// Egyptian governorate tiers the shipping team prices against.
    pub fn egypt() -> Self {
        let tiers = vec![
            ZoneTier::new(
                "capital",
                &["القاهرة", "الجيزة", "القليوبية"],
                Zone::new(dec!(40), dec!(5)),
            ),
            ZoneTier::new(
                "delta",
                &[
                    "الإسكندرية", "البحيرة", "الشرقية", "المنوفية", "الغربية", "كفر الشيخ",
                    "دمياط", "بورسعيد", "الإسماعيلية", "السويس", "الدقهلية",
                ],
                Zone::new(dec!(50), dec!(7)),
            ),
            ZoneTier::new(
                "upper_near",
                &["الفيوم", "بني سويف", "المنيا", "أسيوط", "سوهاج"],
                Zone::new(dec!(65), dec!(10)),
            ),
            ZoneTier::new(
                "upper_far",
                &["قنا", "الأقصر", "أسوان"],
                Zone::new(dec!(80), dec!(12)),
            ),
        ];

        Self::new(tiers, REMOTE_ZONE)
    }

    pub fn tiers(&self) -> &[ZoneTier] {
        &self.tiers
    }

    pub fn fallback(&self) -> Zone {
        self.fallback
    }

    /// Name of the tier a city resolves to, `None` for the remote fallback.
    pub fn tier_name(&self, city: &str) -> Option<&str> {
        let city = city.trim();
        self.tiers
            .iter()
            .find(|tier| tier.cities.iter().any(|c| c.trim() == city))
            .map(|tier| tier.name.as_str())
    }
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::egypt()
    }
}

impl ZoneLookup for ZoneTable {
    fn zone_for(&self, city: &str) -> Zone {
        self.index.get(city.trim()).copied().unwrap_or(self.fallback)
    }
}
