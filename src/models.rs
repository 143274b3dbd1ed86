// src/models.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// A brand, model or year option as listed by the pricing API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(deserialize_with = "code_as_string")]
    pub code: String,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        CatalogEntry {
            name: name.into(),
            code: code.into(),
        }
    }
}

/// Monthly snapshot of the price table. Upstream lists them newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencePeriod {
    #[serde(deserialize_with = "code_as_u32")]
    pub code: u32,
    pub month: String,
}

impl ReferencePeriod {
    pub fn new(code: u32, month: impl Into<String>) -> Self {
        ReferencePeriod {
            code,
            month: month.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleQuery {
    pub brand: String,
    pub model: String,
    pub year: String,
}

impl VehicleQuery {
    pub fn new(brand: impl Into<String>, model: impl Into<String>, year: impl Into<String>) -> Self {
        VehicleQuery {
            brand: brand.into(),
            model: model.into(),
            year: year.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVehicle {
    pub brand: CatalogEntry,
    pub model: CatalogEntry,
    pub year: CatalogEntry,
}

impl ResolvedVehicle {
    pub fn label(&self) -> String {
        format!("{} - {} ({})", self.brand.name, self.model.name, self.year.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricePoint {
    pub reference: u32,
    pub month: String,
    pub price: Decimal,
}

/// One row of a price history: the observation plus its change against the
/// previous period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceChange {
    pub reference: u32,
    pub month: String,
    pub price: Decimal,
    pub delta: Decimal,
    pub delta_percent: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceHistory {
    /// Oldest fetched observation; only used to seed the first delta.
    pub seed: PricePoint,
    /// Oldest first.
    pub changes: Vec<PriceChange>,
    pub current_price: Decimal,
    pub last_change: Decimal,
    pub cumulative_change: Decimal,
    pub cumulative_percent: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleHistory {
    pub vehicle: ResolvedVehicle,
    pub history: PriceHistory,
}

// Upstream APIs are inconsistent about quoting codes, so accept both.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Text(String),
    Number(u64),
}

pub(crate) fn code_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawCode::deserialize(deserializer)? {
        RawCode::Text(s) => s,
        RawCode::Number(n) => n.to_string(),
    })
}

pub(crate) fn code_as_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match RawCode::deserialize(deserializer)? {
        RawCode::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        RawCode::Number(n) => u32::try_from(n).map_err(serde::de::Error::custom),
    }
}
