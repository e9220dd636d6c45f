//! HTTP client for the advisory service.
//!
//! Bodies are decoded into `serde_json::Value` first so the shape rules
//! (bare vs. wrapped arrays, absent fields) apply before typed decoding.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use cropwise_core::{ApiConfig, ReqwestErrorExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use crate::error::FetchError;
use crate::fallback::coordinate_label;
use crate::types::{
    Advisory, AdvisoryResult, AdvisorySource, DayPoint, ForecastSeries, OrchestrationKey,
    Suggestion,
};

const USER_AGENT: &str = "Cropwise/0.1.0";

/// Remote operations the orchestration layer depends on.
#[async_trait]
pub trait AdvisoryApi: Send + Sync {
    /// `GET /locations?location=<query>`
    async fn lookup_locations(&self, query: &str) -> Result<Vec<Suggestion>, FetchError>;

    /// `GET /advisory?lat=&lon=&crop=`
    async fn fetch_advisory(&self, key: &OrchestrationKey) -> Result<AdvisoryResult, FetchError>;

    /// `GET /forecast_chart?lat=&lon=`
    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<ForecastSeries, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Self::build(&config.base_url, config.request_timeout())
    }

    /// Client pointed at `base_url` with a fixed, non-zero timeout.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            anyhow::bail!("Request timeout must be greater than zero");
        }
        Self::build(base_url, Some(timeout))
    }

    fn build(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;
        if parsed.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot carry a path: {}", base_url);
        }

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(path);
        }
        url.query_pairs_mut().clear().extend_pairs(params);
        url
    }

    async fn get_json(&self, url: Url) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadResponse(format!("HTTP {}", status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::BadResponse(format!("Unreadable body: {}", e)))
    }
}

#[async_trait]
impl AdvisoryApi for ApiClient {
    #[instrument(skip(self), level = "debug")]
    async fn lookup_locations(&self, query: &str) -> Result<Vec<Suggestion>, FetchError> {
        let url = self.endpoint("locations", &[("location", query)]);
        let body = self.get_json(url).await?;
        parse_locations(body)
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_advisory(&self, key: &OrchestrationKey) -> Result<AdvisoryResult, FetchError> {
        let lat = key.lat.to_string();
        let lon = key.lon.to_string();
        let url = self.endpoint(
            "advisory",
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("crop", key.crop.as_str()),
            ],
        );
        let body = self.get_json(url).await?;
        parse_advisory(body, key)
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<ForecastSeries, FetchError> {
        let lat = lat.to_string();
        let lon = lon.to_string();
        let url = self.endpoint(
            "forecast_chart",
            &[("lat", lat.as_str()), ("lon", lon.as_str())],
        );
        let body = self.get_json(url).await?;
        parse_forecast(body)
    }
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|e| FetchError::BadResponse(format!("{}: {}", what, e)))
}

/// Bare array or `{ "results": [...] }`. Empty yields `EmptyResult`.
pub fn parse_locations(body: Value) -> Result<Vec<Suggestion>, FetchError> {
    let items = match body {
        Value::Array(_) => body,
        Value::Object(mut map) => match map.remove("results") {
            None | Some(Value::Null) => Value::Array(Vec::new()),
            Some(results @ Value::Array(_)) => results,
            Some(other) => {
                return Err(FetchError::BadResponse(format!(
                    "results is not an array: {}",
                    other
                )))
            }
        },
        other => {
            return Err(FetchError::BadResponse(format!(
                "unexpected locations payload: {}",
                other
            )))
        }
    };

    let suggestions: Vec<Suggestion> = decode(items, "locations")?;
    if suggestions.is_empty() {
        return Err(FetchError::EmptyResult);
    }
    Ok(suggestions)
}

/// `{ advisories, location?: { label } }`. Zero advisories is valid content.
pub fn parse_advisory(body: Value, key: &OrchestrationKey) -> Result<AdvisoryResult, FetchError> {
    let Value::Object(mut map) = body else {
        return Err(FetchError::BadResponse(
            "advisory payload is not an object".to_string(),
        ));
    };

    let advisories: Vec<Advisory> = match map.remove("advisories") {
        None | Some(Value::Null) => Vec::new(),
        Some(list) => decode(list, "advisories")?,
    };

    let location_label = map
        .get("location")
        .and_then(|loc| loc.get("label"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| coordinate_label(key.lat, key.lon));

    Ok(AdvisoryResult {
        advisories,
        location_label,
        source: AdvisorySource::Live,
    })
}

/// `{ daily: [...] }`. A missing or non-array `daily`, or an empty one,
/// yields `EmptyResult`.
pub fn parse_forecast(body: Value) -> Result<ForecastSeries, FetchError> {
    let daily = match body.get("daily") {
        Some(daily @ Value::Array(_)) => daily.clone(),
        _ => return Err(FetchError::EmptyResult),
    };

    let points: Vec<DayPoint> = decode(daily, "daily")?;
    if points.is_empty() {
        return Err(FetchError::EmptyResult);
    }
    Ok(ForecastSeries::from_points(points))
}
