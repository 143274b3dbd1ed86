// src/handlers/catalog.rs
use std::sync::Arc;

use log::{error, info};
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::AppState;
use crate::services::resolver::prioritize_brands;

pub async fn get_brands(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to list brands");

    let brands = state.source.brands().await.map_err(|e| {
        error!("Failed to fetch brands: {}", e);
        warp::reject::custom(ApiError::from(e))
    })?;

    Ok(warp::reply::json(&prioritize_brands(&brands)))
}

pub async fn get_models(brand: String, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to list models of brand {}", brand);

    let mut models = state.source.models(&brand).await.map_err(|e| {
        error!("Failed to fetch models of brand {}: {}", brand, e);
        warp::reject::custom(ApiError::from(e))
    })?;
    models.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(warp::reply::json(&models))
}

pub async fn get_years(brand: String, model: String, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to list years of {}/{}", brand, model);

    let years = state.source.years(&brand, &model).await.map_err(|e| {
        error!("Failed to fetch years of {}/{}: {}", brand, model, e);
        warp::reject::custom(ApiError::from(e))
    })?;

    Ok(warp::reply::json(&years))
}

pub async fn get_references(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to list reference periods");

    let references = state.source.references().await.map_err(|e| {
        error!("Failed to fetch reference periods: {}", e);
        warp::reject::custom(ApiError::from(e))
    })?;

    Ok(warp::reply::json(&references))
}
