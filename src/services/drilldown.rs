// src/services/drilldown.rs
use log::{error, info, warn};

use crate::error::{FipeError, Result};
use crate::models::{PriceHistory, PricePoint, ResolvedVehicle, VehicleHistory, VehicleQuery};
use crate::services::currency::parse_brl;
use crate::services::resolver::{closest_match, find_by_name, find_year};
use crate::services::source::{CatalogSource, VehicleCodes};

pub const DEFAULT_HISTORY_MONTHS: usize = 6;

/// How the model name is matched against the brand's model list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ModelMatching {
    /// Case-insensitive substring, first match wins.
    #[default]
    Substring,
    /// Best similarity score at or above `cutoff`.
    Approximate { cutoff: f64 },
}

impl From<&ResolvedVehicle> for VehicleCodes {
    fn from(vehicle: &ResolvedVehicle) -> Self {
        VehicleCodes {
            brand: vehicle.brand.code.clone(),
            model: vehicle.model.code.clone(),
            year: vehicle.year.code.clone(),
        }
    }
}

/// Brand, then model, then year. Each lookup only runs once the previous one
/// resolved.
pub async fn resolve_vehicle(
    source: &dyn CatalogSource,
    query: &VehicleQuery,
    matching: ModelMatching,
) -> Result<ResolvedVehicle> {
    let brands = source.brands().await?;
    let brand = find_by_name(&brands, &query.brand)
        .cloned()
        .ok_or_else(|| FipeError::BrandNotFound(query.brand.clone()))?;
    info!("Resolved brand '{}' to {} ({})", query.brand, brand.name, brand.code);

    let models = source.models(&brand.code).await?;
    let model = match matching {
        ModelMatching::Substring => find_by_name(&models, &query.model),
        ModelMatching::Approximate { cutoff } => closest_match(&models, &query.model, cutoff),
    }
    .cloned()
    .ok_or_else(|| FipeError::ModelNotFound(query.model.clone()))?;
    info!("Resolved model '{}' to {} ({})", query.model, model.name, model.code);

    let years = source.years(&brand.code, &model.code).await?;
    let year = find_year(&years, &query.year)
        .cloned()
        .ok_or_else(|| FipeError::YearNotFound(query.year.clone()))?;
    info!("Resolved year '{}' to {} ({})", query.year, year.name, year.code);

    Ok(ResolvedVehicle { brand, model, year })
}

/// Prices for the newest `months + 1` reference periods. The extra period
/// only seeds the first delta.
///
/// Periods without a price, or with one that does not parse, are skipped.
pub async fn collect_prices(
    source: &dyn CatalogSource,
    codes: &VehicleCodes,
    months: usize,
) -> Result<Vec<PricePoint>> {
    let references = source.references().await?;
    if references.is_empty() {
        return Err(FipeError::NoReferences);
    }

    let mut points = Vec::with_capacity(months + 1);
    for reference in references.iter().take(months + 1) {
        let raw = match source.price(codes, reference).await? {
            Some(raw) => raw,
            None => {
                warn!("No price for {:?} at reference {}", codes, reference.code);
                continue;
            }
        };
        match parse_brl(&raw) {
            Ok(price) => points.push(PricePoint {
                reference: reference.code,
                month: reference.month.trim().to_string(),
                price,
            }),
            Err(e) => warn!("Skipping reference {}: {}", reference.code, e),
        }
    }

    Ok(points)
}

/// Full pipeline for one vehicle. Any failure means no history at all.
pub async fn price_history(
    source: &dyn CatalogSource,
    query: &VehicleQuery,
    months: usize,
    matching: ModelMatching,
) -> Result<VehicleHistory> {
    let result = async {
        let vehicle = resolve_vehicle(source, query, matching).await?;
        let points = collect_prices(source, &VehicleCodes::from(&vehicle), months).await?;
        let history = PriceHistory::from_points(points)?;
        Ok::<_, FipeError>(VehicleHistory { vehicle, history })
    }
    .await;

    match &result {
        Err(e) if e.is_not_found() || matches!(e, FipeError::InsufficientData { .. }) => {
            warn!("No history for {:?}: {}", query, e)
        }
        Err(e) => error!("No history for {:?}: {}", query, e),
        Ok(_) => {}
    }
    result
}

/// Same as [`price_history`] for a vehicle whose codes are already known.
pub async fn history_for_vehicle(
    source: &dyn CatalogSource,
    vehicle: ResolvedVehicle,
    months: usize,
) -> Result<VehicleHistory> {
    let points = collect_prices(source, &VehicleCodes::from(&vehicle), months).await?;
    let history = PriceHistory::from_points(points)?;
    Ok(VehicleHistory { vehicle, history })
}
