// src/bin/rank.rs
use chrono::{Datelike, Utc};
use clap::Parser;
use dotenv::dotenv;
use log::{debug, info, warn};

use fipe_history::config::FipeConfig;
use fipe_history::models::{ResolvedVehicle, VehicleHistory};
use fipe_history::services::calculations::rank_by_change;
use fipe_history::services::currency::{format_brl, format_percent, format_signed_brl};
use fipe_history::services::drilldown::history_for_vehicle;
use fipe_history::services::resolver::find_year;
use fipe_history::services::source::build_source;

/// Scans every model of the selected brands for one model year and ranks
/// them by price change over the period.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Model year to scan, e.g. 2012
    year: i32,
    /// Brand name filters, matched as case-insensitive substrings
    #[arg(short, long, default_value = "Nissan", value_delimiter = ',')]
    brands: Vec<String>,
    /// Months of history
    #[arg(short, long, default_value_t = 12)]
    months: usize,
    /// Only print the first N vehicles
    #[arg(short, long)]
    top: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let latest_year = Utc::now().year() + 1;
    if !(1950..=latest_year).contains(&args.year) {
        anyhow::bail!("year must be between 1950 and {}", latest_year);
    }
    if args.months == 0 {
        anyhow::bail!("months must be at least 1");
    }

    let config = FipeConfig::from_env()?;
    let source = build_source(&config)?;

    let filters: Vec<String> = args.brands.iter().map(|b| b.trim().to_lowercase()).collect();
    let brands: Vec<_> = source
        .brands()
        .await?
        .into_iter()
        .filter(|b| filters.iter().any(|f| b.name.to_lowercase().contains(f)))
        .collect();
    if brands.is_empty() {
        anyhow::bail!("no brand matches {:?}", args.brands);
    }

    let year = args.year.to_string();
    let mut histories: Vec<VehicleHistory> = Vec::new();
    for brand in &brands {
        let models = match source.models(&brand.code).await {
            Ok(models) => models,
            Err(e) => {
                warn!("Skipping brand {}: {}", brand.name, e);
                continue;
            }
        };
        info!("Scanning {} models of {}", models.len(), brand.name);

        for model in models {
            let years = match source.years(&brand.code, &model.code).await {
                Ok(years) => years,
                Err(e) => {
                    debug!("Skipping {}: {}", model.name, e);
                    continue;
                }
            };
            let Some(year_entry) = find_year(&years, &year).cloned() else {
                continue;
            };

            let vehicle = ResolvedVehicle {
                brand: brand.clone(),
                model,
                year: year_entry,
            };
            match history_for_vehicle(source.as_ref(), vehicle, args.months).await {
                Ok(history) => histories.push(history),
                Err(e) => debug!("No history: {}", e),
            }
        }
    }

    if histories.is_empty() {
        println!("No vehicle with enough price history was found.");
        return Ok(());
    }

    let ranked = rank_by_change(&histories);
    let shown = args.top.unwrap_or(ranked.len());
    println!("{:<60} {:>16} {:>16} {:>14} {:>9}", "Vehicle", "Initial", "Final", "Change", "%");
    for entry in ranked.iter().take(shown) {
        println!(
            "{:<60} {:>16} {:>16} {:>14} {:>9}",
            entry.label,
            format_brl(entry.initial_price),
            format_brl(entry.final_price),
            format_signed_brl(entry.change),
            format_percent(entry.change_percent)
        );
    }
    println!("\n{} vehicle(s), {} months back to current.", ranked.len(), args.months);

    Ok(())
}
