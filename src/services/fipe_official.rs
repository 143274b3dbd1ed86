// src/services/fipe_official.rs
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, REFERER};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::OnceCell;

use crate::config::{FipeConfig, VehicleType};
use crate::error::{FipeError, Result};
use crate::models::{code_as_string, code_as_u32, CatalogEntry, ReferencePeriod};
use crate::services::parallelum::throttle;
use crate::services::source::{CatalogSource, VehicleCodes};

#[derive(Debug, Deserialize)]
struct LabelValue {
    #[serde(rename = "Label")]
    label: String,
    #[serde(rename = "Value", deserialize_with = "code_as_string")]
    value: String,
}

impl From<LabelValue> for CatalogEntry {
    fn from(item: LabelValue) -> Self {
        CatalogEntry::new(item.label.trim(), item.value)
    }
}

#[derive(Debug, Deserialize)]
struct RawReference {
    #[serde(rename = "Codigo", deserialize_with = "code_as_u32")]
    code: u32,
    #[serde(rename = "Mes")]
    month: String,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(rename = "Modelos")]
    models: Vec<LabelValue>,
}

#[derive(Debug, Deserialize)]
struct ValueResponse {
    #[serde(rename = "Valor")]
    value: Option<String>,
    #[serde(rename = "erro")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceRequest<'a> {
    codigo_tabela_referencia: u32,
    codigo_tipo_veiculo: u8,
    codigo_marca: &'a str,
    codigo_modelo: &'a str,
    ano: &'a str,
    codigo_tipo_combustivel: u32,
    ano_modelo: u32,
    tipo_consulta: &'a str,
}

/// Client for the site's own POST endpoints (`ConsultarMarcas`, ...).
///
/// The reference table is fetched once and kept; catalog lookups are pinned
/// to its newest entry.
pub struct FipeOfficialClient {
    client: Client,
    base_url: String,
    vehicle_type: VehicleType,
    request_delay: Duration,
    reference_table: OnceCell<Vec<ReferencePeriod>>,
}

impl FipeOfficialClient {
    pub fn new(config: &FipeConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(REFERER, HeaderValue::from_static("http://veiculos.fipe.org.br"));

        let client = Client::builder().default_headers(headers).build()?;

        Ok(FipeOfficialClient {
            client,
            base_url: config.base_url.clone(),
            vehicle_type: config.vehicle_type,
            request_delay: config.request_delay,
            reference_table: OnceCell::new(),
        })
    }

    async fn post<T: DeserializeOwned>(&self, endpoint: &str, body: &Value) -> Result<T> {
        throttle(self.request_delay).await;
        let url = format!("{}/{}", self.base_url, endpoint);
        info!("Posting to {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FipeError::Status {
                status: status.as_u16(),
                url,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FipeError::Decode(format!("{}: {}", endpoint, e)))
    }

    async fn reference_table(&self) -> Result<&[ReferencePeriod]> {
        let table = self
            .reference_table
            .get_or_try_init(|| async {
                let items: Vec<RawReference> =
                    self.post("ConsultarTabelaDeReferencia", &json!({})).await?;
                Ok::<_, FipeError>(
                    items
                        .into_iter()
                        .map(|r| ReferencePeriod::new(r.code, r.month.trim()))
                        .collect(),
                )
            })
            .await?;
        Ok(table.as_slice())
    }

    async fn latest_reference(&self) -> Result<u32> {
        self.reference_table()
            .await?
            .first()
            .map(|r| r.code)
            .ok_or(FipeError::NoReferences)
    }
}

#[async_trait]
impl CatalogSource for FipeOfficialClient {
    async fn brands(&self) -> Result<Vec<CatalogEntry>> {
        let reference = self.latest_reference().await?;
        let body = json!({
            "codigoTabelaReferencia": reference,
            "codigoTipoVeiculo": self.vehicle_type.official_code(),
        });
        let items: Vec<LabelValue> = self.post("ConsultarMarcas", &body).await?;
        Ok(items.into_iter().map(CatalogEntry::from).collect())
    }

    async fn models(&self, brand: &str) -> Result<Vec<CatalogEntry>> {
        let reference = self.latest_reference().await?;
        let body = json!({
            "codigoTabelaReferencia": reference,
            "codigoTipoVeiculo": self.vehicle_type.official_code(),
            "codigoMarca": brand,
        });
        let response: ModelsResponse = self.post("ConsultarModelos", &body).await?;
        Ok(response.models.into_iter().map(CatalogEntry::from).collect())
    }

    async fn years(&self, brand: &str, model: &str) -> Result<Vec<CatalogEntry>> {
        let reference = self.latest_reference().await?;
        let body = json!({
            "codigoTabelaReferencia": reference,
            "codigoTipoVeiculo": self.vehicle_type.official_code(),
            "codigoMarca": brand,
            "codigoModelo": model,
        });
        let items: Vec<LabelValue> = self.post("ConsultarAnoModelo", &body).await?;
        Ok(items.into_iter().map(CatalogEntry::from).collect())
    }

    async fn references(&self) -> Result<Vec<ReferencePeriod>> {
        Ok(self.reference_table().await?.to_vec())
    }

    async fn price(&self, vehicle: &VehicleCodes, reference: &ReferencePeriod) -> Result<Option<String>> {
        let (model_year, fuel) = split_year_code(&vehicle.year)?;
        let request = PriceRequest {
            codigo_tabela_referencia: reference.code,
            codigo_tipo_veiculo: self.vehicle_type.official_code(),
            codigo_marca: &vehicle.brand,
            codigo_modelo: &vehicle.model,
            ano: &vehicle.year,
            codigo_tipo_combustivel: fuel,
            ano_modelo: model_year,
            tipo_consulta: "tradicional",
        };
        let body = serde_json::to_value(&request).map_err(|e| FipeError::Decode(e.to_string()))?;

        let response: ValueResponse = match self.post("ConsultarValorComTodosParametros", &body).await {
            Ok(response) => response,
            Err(FipeError::Status { status: 404, .. }) => {
                warn!("No price for reference {} (404)", reference.code);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if let Some(error) = response.error {
            warn!("No price for reference {}: {}", reference.code, error);
            return Ok(None);
        }
        Ok(response.value)
    }
}

/// `2012-1` is model year 2012 with fuel type 1.
fn split_year_code(code: &str) -> Result<(u32, u32)> {
    let invalid = || FipeError::Decode(format!("malformed year code '{}'", code));
    let (year, fuel) = code.split_once('-').ok_or_else(invalid)?;
    let year = year.trim().parse().map_err(|_| invalid())?;
    let fuel = fuel.trim().parse().map_err(|_| invalid())?;
    Ok((year, fuel))
}
