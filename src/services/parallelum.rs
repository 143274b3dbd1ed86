// src/services/parallelum.rs
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::{FipeConfig, VehicleType};
use crate::error::{FipeError, Result};
use crate::models::{CatalogEntry, ReferencePeriod};
use crate::services::source::{CatalogSource, VehicleCodes};

#[derive(Debug, Deserialize)]
struct PriceResponse {
    price: Option<String>,
}

/// Client for the public REST API (`/cars/brands/...`).
pub struct ParallelumClient {
    client: Client,
    base_url: String,
    vehicle_type: VehicleType,
    request_delay: Duration,
}

impl ParallelumClient {
    pub fn new(config: &FipeConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(token)
                .map_err(|e| FipeError::Config(format!("invalid FIPE_API_TOKEN: {}", e)))?;
            headers.insert("x-subscription-token", value);
        }

        let client = Client::builder().default_headers(headers).build()?;

        Ok(ParallelumClient {
            client,
            base_url: config.base_url.clone(),
            vehicle_type: config.vehicle_type,
            request_delay: config.request_delay,
        })
    }

    fn vehicle_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.vehicle_type.path(), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        throttle(self.request_delay).await;
        info!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FipeError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FipeError::Decode(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl CatalogSource for ParallelumClient {
    async fn brands(&self) -> Result<Vec<CatalogEntry>> {
        self.get_json(&self.vehicle_url("brands")).await
    }

    async fn models(&self, brand: &str) -> Result<Vec<CatalogEntry>> {
        self.get_json(&self.vehicle_url(&format!("brands/{}/models", brand))).await
    }

    async fn years(&self, brand: &str, model: &str) -> Result<Vec<CatalogEntry>> {
        self.get_json(&self.vehicle_url(&format!("brands/{}/models/{}/years", brand, model)))
            .await
    }

    async fn references(&self) -> Result<Vec<ReferencePeriod>> {
        self.get_json(&format!("{}/references", self.base_url)).await
    }

    async fn price(&self, vehicle: &VehicleCodes, reference: &ReferencePeriod) -> Result<Option<String>> {
        let url = self.vehicle_url(&format!(
            "brands/{}/models/{}/years/{}",
            vehicle.brand, vehicle.model, vehicle.year
        ));
        throttle(self.request_delay).await;
        info!("Fetching price for reference {} from {}", reference.code, url);

        let response = self
            .client
            .get(&url)
            .query(&[("reference", reference.code)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!("No price for reference {} ({})", reference.code, status);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FipeError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body: PriceResponse = response
            .json()
            .await
            .map_err(|e| FipeError::Decode(format!("{}: {}", url, e)))?;
        Ok(body.price)
    }
}

/// Fixed pause before each upstream call, to stay under the rate limit.
pub(crate) async fn throttle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
