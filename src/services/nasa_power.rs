use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::config::NasaPowerConfig;
use crate::models::estimate::{PowerResponse, IRRADIANCE_PARAMETER};

/// POWER marks missing samples with this value.
const FILL_VALUE: f64 = -999.0;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to NASA POWER failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("NASA POWER answered with status {0}")]
    Status(StatusCode),
    #[error("unexpected NASA POWER response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("NASA POWER has no irradiance value for {0}")]
    NoData(String),
}

/// Anything that can answer "how much sun fell here on that day".
pub trait IrradianceSource {
    /// Daily irradiance in kWh/m²/day. `date` is `YYYYMMDD`.
    fn fetch_irradiance(
        &self,
        latitude: f64,
        longitude: f64,
        date: &str,
    ) -> impl Future<Output = Result<f64, FetchError>> + Send;
}

/// Client for the POWER daily point endpoint.
#[derive(Debug, Clone)]
pub struct NasaPowerClient {
    http: Client,
    base_url: String,
    community: String,
}

impl NasaPowerClient {
    pub fn new(cfg: &NasaPowerConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(secs) = cfg.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            base_url: cfg.base_url.clone(),
            community: cfg.community.clone(),
        })
    }
}

impl IrradianceSource for NasaPowerClient {
    async fn fetch_irradiance(&self, latitude: f64, longitude: f64, date: &str) -> Result<f64, FetchError> {
        // Single-day query: start == end
        let params = [
            ("parameters", IRRADIANCE_PARAMETER.to_string()),
            ("community", self.community.clone()),
            ("longitude", longitude.to_string()),
            ("latitude", latitude.to_string()),
            ("start", date.to_string()),
            ("end", date.to_string()),
            ("format", "JSON".to_string()),
        ];

        debug!(%latitude, %longitude, date, url = %self.base_url, "requesting irradiance");
        let response = self.http.get(&self.base_url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        #[cfg(feature = "verbose_log")]
        debug!(%body, "NASA POWER raw response");

        parse_irradiance(&body, date)
    }
}

/// Pulls the day's value out of a POWER JSON body.
///
/// The entry keyed by `date` wins; otherwise the first entry of the series is used.
pub fn parse_irradiance(body: &str, date: &str) -> Result<f64, FetchError> {
    let response: PowerResponse = serde_json::from_str(body)?;
    let series = response.properties.parameter.allsky_sfc_sw_dwn;

    let value = series
        .get(date)
        .or_else(|| series.values().next())
        .copied()
        .ok_or_else(|| FetchError::NoData(date.to_string()))?;

    if value <= FILL_VALUE {
        return Err(FetchError::NoData(date.to_string()));
    }
    Ok(value)
}
