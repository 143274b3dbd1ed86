// src/handlers/mod.rs
use std::sync::Arc;

use crate::services::source::CatalogSource;

pub mod catalog;
pub mod error;
pub mod history;

/// Shared by every route.
pub struct AppState {
    pub source: Arc<dyn CatalogSource>,
    pub history_months: usize,
}
