use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use env_logger;
use log::{info, warn};
use warp::Filter;

use fipe_history::config::FipeConfig;
use fipe_history::handlers::AppState;
use fipe_history::routes;
use fipe_history::services::source::build_source;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = FipeConfig::from_env()?;
    info!("Using {:?} API at {} ({} months of history)", config.api, config.base_url, config.history_months);

    let port_str = env::var("PORT").unwrap_or_else(|_| {
        warn!("$PORT not set, defaulting to 3030");
        "3030".to_string()
    });
    let port: u16 = port_str
        .parse()
        .map_err(|e| anyhow::anyhow!("PORT must be a number: {}", e))?;

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!("Will bind to: {}", addr);

    let state = Arc::new(AppState {
        source: build_source(&config)?,
        history_months: config.history_months,
    });

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET"]);

    let api = routes::routes(state).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
    Ok(())
}
