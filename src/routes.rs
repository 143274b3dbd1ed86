// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;

use log::info;
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::catalog::{get_brands, get_models, get_references, get_years};
use crate::handlers::error::ApiError;
use crate::handlers::history::{get_history, HistoryParams};
use crate::handlers::AppState;

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if let Some(invalid) = err.find::<warp::reject::InvalidQuery>() {
        code = StatusCode::BAD_REQUEST;
        message = invalid.to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(state: Arc<AppState>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    let brands_route = warp::path!("api" / "v1" / "brands")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_brands);

    let models_route = warp::path!("api" / "v1" / "brands" / String / "models")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_models);

    let years_route = warp::path!("api" / "v1" / "brands" / String / "models" / String / "years")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_years);

    let references_route = warp::path!("api" / "v1" / "references")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_references);

    let history_route = warp::path!("api" / "v1" / "history")
        .and(warp::get())
        .and(warp::query::<HistoryParams>())
        .and(state_filter.clone())
        .and_then(get_history);

    info!("All routes configured successfully.");

    brands_route
        .or(models_route)
        .or(years_route)
        .or(references_route)
        .or(history_route)
        .recover(handle_rejection)
}
