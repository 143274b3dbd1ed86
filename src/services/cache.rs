// src/services/cache.rs
use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::{CatalogEntry, ReferencePeriod};
use crate::services::source::{CatalogSource, VehicleCodes};

#[derive(Default)]
struct Memo {
    brands: Option<Vec<CatalogEntry>>,
    models: HashMap<String, Vec<CatalogEntry>>,
    years: HashMap<(String, String), Vec<CatalogEntry>>,
    references: Option<Vec<ReferencePeriod>>,
    prices: HashMap<(VehicleCodes, u32), String>,
}

/// Remembers every successful answer for the life of the process, keyed on
/// the call arguments. Errors and missing prices are not cached, so they are
/// asked again next time. Nothing is ever evicted.
pub struct CachedSource<S> {
    inner: S,
    memo: Mutex<Memo>,
}

impl<S: CatalogSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        CachedSource {
            inner,
            memo: Mutex::new(Memo::default()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: CatalogSource> CatalogSource for CachedSource<S> {
    async fn brands(&self) -> Result<Vec<CatalogEntry>> {
        if let Some(hit) = self.memo.lock().await.brands.clone() {
            debug!("Cache hit: brands");
            return Ok(hit);
        }
        let fresh = self.inner.brands().await?;
        self.memo.lock().await.brands = Some(fresh.clone());
        Ok(fresh)
    }

    async fn models(&self, brand: &str) -> Result<Vec<CatalogEntry>> {
        if let Some(hit) = self.memo.lock().await.models.get(brand).cloned() {
            debug!("Cache hit: models of {}", brand);
            return Ok(hit);
        }
        let fresh = self.inner.models(brand).await?;
        self.memo.lock().await.models.insert(brand.to_string(), fresh.clone());
        Ok(fresh)
    }

    async fn years(&self, brand: &str, model: &str) -> Result<Vec<CatalogEntry>> {
        let key = (brand.to_string(), model.to_string());
        if let Some(hit) = self.memo.lock().await.years.get(&key).cloned() {
            debug!("Cache hit: years of {}/{}", brand, model);
            return Ok(hit);
        }
        let fresh = self.inner.years(brand, model).await?;
        self.memo.lock().await.years.insert(key, fresh.clone());
        Ok(fresh)
    }

    async fn references(&self) -> Result<Vec<ReferencePeriod>> {
        if let Some(hit) = self.memo.lock().await.references.clone() {
            debug!("Cache hit: references");
            return Ok(hit);
        }
        let fresh = self.inner.references().await?;
        self.memo.lock().await.references = Some(fresh.clone());
        Ok(fresh)
    }

    async fn price(&self, vehicle: &VehicleCodes, reference: &ReferencePeriod) -> Result<Option<String>> {
        let key = (vehicle.clone(), reference.code);
        if let Some(hit) = self.memo.lock().await.prices.get(&key).cloned() {
            debug!("Cache hit: price {:?} @ {}", vehicle, reference.code);
            return Ok(Some(hit));
        }
        let fresh = self.inner.price(vehicle, reference).await?;
        if let Some(price) = &fresh {
            self.memo.lock().await.prices.insert(key, price.clone());
        }
        Ok(fresh)
    }
}
