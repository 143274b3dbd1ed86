// src/bin/history.rs
use clap::Parser;
use dotenv::dotenv;
use log::info;

use fipe_history::config::FipeConfig;
use fipe_history::models::VehicleQuery;
use fipe_history::services::currency::{format_brl, format_percent, format_signed_brl};
use fipe_history::services::drilldown::{price_history, ModelMatching};
use fipe_history::services::resolver::DEFAULT_SIMILARITY_CUTOFF;
use fipe_history::services::source::build_source;
use fipe_history::FipeError;

/// Monthly FIPE price history of one vehicle.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Brand name or part of it, e.g. "toyota"
    brand: String,
    /// Model name or part of it, e.g. "corolla xei"
    model: String,
    /// Model year, e.g. "2012" or a year code such as "2012-1"
    year: String,
    /// Months of history (defaults to FIPE_HISTORY_MONTHS)
    #[arg(short, long)]
    months: Option<usize>,
    /// Match the model by similarity instead of substring
    #[arg(long)]
    approximate: bool,
    /// Minimum similarity for --approximate
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_CUTOFF)]
    cutoff: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let config = FipeConfig::from_env()?;
    let months = args.months.unwrap_or(config.history_months);
    let matching = if args.approximate {
        ModelMatching::Approximate { cutoff: args.cutoff }
    } else {
        ModelMatching::Substring
    };
    let source = build_source(&config)?;

    let query = VehicleQuery::new(args.brand, args.model, args.year);
    info!("Looking up {:?} over {} months", query, months);

    let found = match price_history(source.as_ref(), &query, months, matching).await {
        Ok(found) => found,
        Err(FipeError::InsufficientData { points }) => {
            println!("Insufficient data: only {} price(s) found for this vehicle.", points);
            std::process::exit(1);
        }
        Err(e) => {
            println!("No price history available for this vehicle ({}).", e);
            std::process::exit(1);
        }
    };

    let history = &found.history;
    println!("{}", found.vehicle.label());
    println!(
        "Current price: {} ({} vs previous month)",
        format_brl(history.current_price),
        format_signed_brl(history.last_change)
    );
    println!();
    println!("{:<22} {:>18} {:>14} {:>10}", "Month", "Price", "Change", "%");
    for change in &history.changes {
        println!(
            "{:<22} {:>18} {:>14} {:>10}",
            change.month,
            format_brl(change.price),
            format_signed_brl(change.delta),
            format_percent(change.delta_percent)
        );
    }
    println!();
    println!(
        "Since {}: {} ({})",
        history.seed.month,
        format_signed_brl(history.cumulative_change),
        format_percent(history.cumulative_percent)
    );

    Ok(())
}
