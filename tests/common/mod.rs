// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use fipe_history::models::{CatalogEntry, ReferencePeriod};
use fipe_history::services::source::{CatalogSource, VehicleCodes};
use fipe_history::{FipeError, Result};

/// In-memory catalog that records every call it receives.
#[derive(Default)]
pub struct FakeSource {
    pub brands: Vec<CatalogEntry>,
    pub models: HashMap<String, Vec<CatalogEntry>>,
    pub years: HashMap<(String, String), Vec<CatalogEntry>>,
    pub references: Vec<ReferencePeriod>,
    pub prices: HashMap<u32, String>,
    pub fail_brands: bool,
    /// The first this many price calls answer `None`.
    pub blank_prices: Mutex<usize>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSource {
    /// One Toyota with two Corolla models, 2012 year options and seven
    /// monthly references (newest first) priced 100 → 160.
    pub fn toyota() -> Self {
        let mut source = FakeSource {
            brands: vec![
                CatalogEntry::new("Fiat", "21"),
                CatalogEntry::new("Toyota", "56"),
            ],
            ..Default::default()
        };
        source.models.insert(
            "56".into(),
            vec![
                CatalogEntry::new("Corolla GLi 1.8 Flex 16V Aut.", "4827"),
                CatalogEntry::new("Corolla XEi 2.0 Flex 16V Aut.", "4828"),
            ],
        );
        for model in ["4827", "4828"] {
            source.years.insert(
                ("56".into(), model.into()),
                vec![
                    CatalogEntry::new("2013 Flex", "2013-1"),
                    CatalogEntry::new("2012 Flex", "2012-1"),
                ],
            );
        }
        for (i, code) in (300..=306).rev().enumerate() {
            source
                .references
                .push(ReferencePeriod::new(code, format!("month {}", code)));
            let price = 160 - 10 * i as u32;
            source.prices.insert(code, format!("R$ {},00", price));
        }
        source
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CatalogSource for FakeSource {
    async fn brands(&self) -> Result<Vec<CatalogEntry>> {
        self.record("brands".into());
        if self.fail_brands {
            return Err(FipeError::Status {
                status: 503,
                url: "fake://brands".into(),
            });
        }
        Ok(self.brands.clone())
    }

    async fn models(&self, brand: &str) -> Result<Vec<CatalogEntry>> {
        self.record(format!("models {}", brand));
        Ok(self.models.get(brand).cloned().unwrap_or_default())
    }

    async fn years(&self, brand: &str, model: &str) -> Result<Vec<CatalogEntry>> {
        self.record(format!("years {} {}", brand, model));
        Ok(self
            .years
            .get(&(brand.to_string(), model.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn references(&self) -> Result<Vec<ReferencePeriod>> {
        self.record("references".into());
        Ok(self.references.clone())
    }

    async fn price(&self, vehicle: &VehicleCodes, reference: &ReferencePeriod) -> Result<Option<String>> {
        self.record(format!("price {} {}", vehicle.year, reference.code));
        {
            let mut blank = self.blank_prices.lock().unwrap();
            if *blank > 0 {
                *blank -= 1;
                return Ok(None);
            }
        }
        Ok(self.prices.get(&reference.code).cloned())
    }
}
