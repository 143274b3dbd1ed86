// src/config.rs
use std::env;
use std::str::FromStr;
use std::time::Duration;

use log::warn;

use crate::error::{FipeError, Result};
use crate::services::drilldown::DEFAULT_HISTORY_MONTHS;

pub const PARALLELUM_BASE_URL: &str = "https://fipe.parallelum.com.br/api/v2";
pub const FIPE_OFFICIAL_BASE_URL: &str = "http://veiculos.fipe.org.br/api/veiculos";

/// Which upstream pricing API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKind {
    /// Public REST API with an optional subscription token.
    Parallelum,
    /// The site's own POST endpoints.
    Official,
}

impl FromStr for ApiKind {
    type Err = FipeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "parallelum" => Ok(ApiKind::Parallelum),
            "official" | "fipe" => Ok(ApiKind::Official),
            other => Err(FipeError::Config(format!("unknown FIPE_API '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleType {
    Cars,
    Motorcycles,
    Trucks,
}

impl VehicleType {
    /// Path segment used by the REST API.
    pub fn path(&self) -> &'static str {
        match self {
            VehicleType::Cars => "cars",
            VehicleType::Motorcycles => "motorcycles",
            VehicleType::Trucks => "trucks",
        }
    }

    /// `codigoTipoVeiculo` used by the POST API.
    pub fn official_code(&self) -> u8 {
        match self {
            VehicleType::Cars => 1,
            VehicleType::Motorcycles => 2,
            VehicleType::Trucks => 3,
        }
    }
}

impl FromStr for VehicleType {
    type Err = FipeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cars" | "car" => Ok(VehicleType::Cars),
            "motorcycles" | "motorcycle" => Ok(VehicleType::Motorcycles),
            "trucks" | "truck" => Ok(VehicleType::Trucks),
            other => Err(FipeError::Config(format!("unknown vehicle type '{}'", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FipeConfig {
    pub api: ApiKind,
    pub base_url: String,
    pub token: Option<String>,
    pub vehicle_type: VehicleType,
    pub history_months: usize,
    pub request_delay: Duration,
}

impl Default for FipeConfig {
    fn default() -> Self {
        FipeConfig {
            api: ApiKind::Parallelum,
            base_url: PARALLELUM_BASE_URL.to_string(),
            token: None,
            vehicle_type: VehicleType::Cars,
            history_months: DEFAULT_HISTORY_MONTHS,
            request_delay: Duration::ZERO,
        }
    }
}

impl FipeConfig {
    /// Reads the FIPE_* variables. Call `dotenv().ok()` first to pick up `.env`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api = match lookup("FIPE_API") {
            Some(v) => v.parse()?,
            None => ApiKind::Parallelum,
        };

        let base_url = lookup("FIPE_BASE_URL").unwrap_or_else(|| match api {
            ApiKind::Parallelum => PARALLELUM_BASE_URL.to_string(),
            ApiKind::Official => FIPE_OFFICIAL_BASE_URL.to_string(),
        });

        let token = lookup("FIPE_API_TOKEN").filter(|t| !t.trim().is_empty());
        if token.is_none() && api == ApiKind::Parallelum {
            warn!("FIPE_API_TOKEN not set, using the anonymous request quota");
        }

        let vehicle_type = match lookup("FIPE_VEHICLE_TYPE") {
            Some(v) => v.parse()?,
            None => VehicleType::Cars,
        };

        let history_months = match lookup("FIPE_HISTORY_MONTHS") {
            Some(v) => v.trim().parse::<usize>().map_err(|e| {
                FipeError::Config(format!("FIPE_HISTORY_MONTHS must be a number: {}", e))
            })?,
            None => DEFAULT_HISTORY_MONTHS,
        };
        if history_months == 0 {
            return Err(FipeError::Config("FIPE_HISTORY_MONTHS must be at least 1".into()));
        }

        let request_delay = match lookup("FIPE_REQUEST_DELAY_MS") {
            Some(v) => Duration::from_millis(v.trim().parse::<u64>().map_err(|e| {
                FipeError::Config(format!("FIPE_REQUEST_DELAY_MS must be a number: {}", e))
            })?),
            None => Duration::ZERO,
        };

        Ok(FipeConfig {
            api,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            vehicle_type,
            history_months,
            request_delay,
        })
    }
}
