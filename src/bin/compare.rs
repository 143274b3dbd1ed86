// src/bin/compare.rs
use clap::Parser;
use dotenv::dotenv;
use log::warn;

use fipe_history::config::{ApiKind, FipeConfig, FIPE_OFFICIAL_BASE_URL};
use fipe_history::models::VehicleQuery;
use fipe_history::services::currency::{format_brl, format_percent, format_signed_brl};
use fipe_history::services::drilldown::{price_history, ModelMatching};
use fipe_history::services::resolver::DEFAULT_SIMILARITY_CUTOFF;
use fipe_history::services::source::build_source;

const TRACKED_VEHICLES: &[(&str, &str, &str)] = &[
    ("Toyota", "Corolla XEi 2.0 Flex 16V Aut.", "2012"),
    ("Honda", "Civic Sed. LXL/ LXL SE 1.8 Flex 16V Aut.", "2013"),
    ("Nissan", "Sentra SL 2.0/ 2.0 Flex Fuel 16V Aut.", "2016"),
    ("Hyundai", "ix35 GLS 2.0 16V 2WD Flex Aut.", "2012"),
    ("Kia Motors", "Sportage EX 2.0 16V/ 2.0 16V Flex Aut.", "2012"),
    ("Kia Motors", "Sorento 3.5 V6 24V 4x2 Aut.", "2013"),
    ("Hyundai", "Santa Fe GLS 3.5 V6 4x4 Tiptronic", "2013"),
];

/// Compares the recent price movement of a fixed set of vehicles.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Months of history
    #[arg(short, long, default_value_t = 12)]
    months: usize,
    /// Use the site's own API instead of FIPE_API
    #[arg(long)]
    official: bool,
    /// Minimum model-name similarity
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_CUTOFF)]
    cutoff: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let mut config = FipeConfig::from_env()?;
    if args.official && config.api != ApiKind::Official {
        config.api = ApiKind::Official;
        config.base_url = FIPE_OFFICIAL_BASE_URL.to_string();
    }
    let source = build_source(&config)?;
    let matching = ModelMatching::Approximate { cutoff: args.cutoff };

    println!("{:<60} {:>16} {:>14} {:>14} {:>9}", "Vehicle", "Current", "Last month", "Period", "%");
    for (brand, model, year) in TRACKED_VEHICLES {
        let query = VehicleQuery::new(*brand, *model, *year);
        match price_history(source.as_ref(), &query, args.months, matching).await {
            Ok(found) => println!(
                "{:<60} {:>16} {:>14} {:>14} {:>9}",
                found.vehicle.label(),
                format_brl(found.history.current_price),
                format_signed_brl(found.history.last_change),
                format_signed_brl(found.history.cumulative_change),
                format_percent(found.history.cumulative_percent)
            ),
            Err(e) => warn!("Skipping {} {} {}: {}", brand, model, year, e),
        }
    }

    Ok(())
}
