// src/handlers/history.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::AppState;
use crate::models::{PriceHistory, ResolvedVehicle, VehicleQuery};
use crate::services::drilldown::{price_history, ModelMatching};
use crate::services::resolver::DEFAULT_SIMILARITY_CUTOFF;

pub const MAX_HISTORY_MONTHS: usize = 36;

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub brand: String,
    pub model: String,
    pub year: String,
    pub months: Option<usize>,
    #[serde(default)]
    pub approximate: bool,
    pub cutoff: Option<f64>,
}

#[derive(Serialize)]
struct HistoryResponse {
    vehicle: ResolvedVehicle,
    months: usize,
    history: PriceHistory,
    generated_at: DateTime<Utc>,
}

pub async fn get_history(params: HistoryParams, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request for price history of {} {} {}", params.brand, params.model, params.year);

    let months = params.months.unwrap_or(state.history_months);
    if months == 0 || months > MAX_HISTORY_MONTHS {
        return Err(warp::reject::custom(ApiError::bad_request(format!(
            "months must be between 1 and {}",
            MAX_HISTORY_MONTHS
        ))));
    }

    let matching = if params.approximate {
        let cutoff = params.cutoff.unwrap_or(DEFAULT_SIMILARITY_CUTOFF);
        if !(0.0..=1.0).contains(&cutoff) {
            return Err(warp::reject::custom(ApiError::bad_request("cutoff must be between 0 and 1")));
        }
        ModelMatching::Approximate { cutoff }
    } else {
        ModelMatching::Substring
    };

    let query = VehicleQuery::new(params.brand, params.model, params.year);
    let found = price_history(state.source.as_ref(), &query, months, matching)
        .await
        .map_err(|e| warp::reject::custom(ApiError::from(e)))?;

    debug!("Returning {} price changes for {}", found.history.changes.len(), found.vehicle.label());
    Ok(warp::reply::json(&HistoryResponse {
        vehicle: found.vehicle,
        months,
        history: found.history,
        generated_at: Utc::now(),
    }))
}
