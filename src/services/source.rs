// src/services/source.rs
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{ApiKind, FipeConfig};
use crate::error::Result;
use crate::models::{CatalogEntry, ReferencePeriod};
use crate::services::cache::CachedSource;
use crate::services::fipe_official::FipeOfficialClient;
use crate::services::parallelum::ParallelumClient;

/// Internal codes of a fully resolved vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VehicleCodes {
    pub brand: String,
    pub model: String,
    pub year: String,
}

/// A pricing API able to answer the drill-down lookups.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn brands(&self) -> Result<Vec<CatalogEntry>>;

    async fn models(&self, brand: &str) -> Result<Vec<CatalogEntry>>;

    async fn years(&self, brand: &str, model: &str) -> Result<Vec<CatalogEntry>>;

    /// Newest first.
    async fn references(&self) -> Result<Vec<ReferencePeriod>>;

    /// Raw price string for one reference period, `None` when upstream has
    /// no price for it.
    async fn price(&self, vehicle: &VehicleCodes, reference: &ReferencePeriod) -> Result<Option<String>>;
}

/// Memoized client for the configured upstream.
pub fn build_source(config: &FipeConfig) -> Result<Arc<dyn CatalogSource>> {
    let source: Arc<dyn CatalogSource> = match config.api {
        ApiKind::Parallelum => Arc::new(CachedSource::new(ParallelumClient::new(config)?)),
        ApiKind::Official => Arc::new(CachedSource::new(FipeOfficialClient::new(config)?)),
    };
    Ok(source)
}
