//! Scripted in-memory `AdvisoryApi` for orchestration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use cropwise_advisory::{
    AdvisoryApi, AdvisoryResult, AdvisorySource, DayPoint, FetchError, ForecastSeries,
    OrchestrationKey, Suggestion,
};
use cropwise_core::NetworkError;
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Lookup(String),
    Advisory(OrchestrationKey),
    Forecast(f64, f64),
}

#[derive(Clone)]
struct Scripted<T> {
    delay: Duration,
    result: Result<T, FetchError>,
}

/// Responses are looked up by query, by crop and by latitude respectively.
/// Unscripted requests fail with `EmptyResult` (lookup, forecast) or
/// `BadResponse` (advisory).
#[derive(Default)]
pub struct FakeApi {
    lookups: Mutex<HashMap<String, Scripted<Vec<Suggestion>>>>,
    advisories: Mutex<HashMap<String, Scripted<AdvisoryResult>>>,
    forecasts: Mutex<HashMap<String, Scripted<ForecastSeries>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_lookup(&self, query: &str, delay: Duration, result: Result<Vec<Suggestion>, FetchError>) {
        self.lookups
            .lock()
            .insert(query.to_string(), Scripted { delay, result });
    }

    pub fn on_advisory(&self, crop: &str, delay: Duration, result: Result<AdvisoryResult, FetchError>) {
        self.advisories
            .lock()
            .insert(crop.to_string(), Scripted { delay, result });
    }

    pub fn on_forecast(&self, lat: f64, delay: Duration, result: Result<ForecastSeries, FetchError>) {
        self.forecasts
            .lock()
            .insert(lat.to_string(), Scripted { delay, result });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn lookup_queries(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Lookup(q) => Some(q.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl AdvisoryApi for FakeApi {
    async fn lookup_locations(&self, query: &str) -> Result<Vec<Suggestion>, FetchError> {
        self.calls.lock().push(Call::Lookup(query.to_string()));
        let scripted = self.lookups.lock().get(query).cloned();
        match scripted {
            Some(s) => {
                tokio::time::sleep(s.delay).await;
                s.result
            }
            None => Err(FetchError::EmptyResult),
        }
    }

    async fn fetch_advisory(&self, key: &OrchestrationKey) -> Result<AdvisoryResult, FetchError> {
        self.calls.lock().push(Call::Advisory(key.clone()));
        let scripted = self.advisories.lock().get(&key.crop).cloned();
        match scripted {
            Some(s) => {
                tokio::time::sleep(s.delay).await;
                s.result
            }
            None => Err(FetchError::BadResponse("unscripted".into())),
        }
    }

    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<ForecastSeries, FetchError> {
        self.calls.lock().push(Call::Forecast(lat, lon));
        let scripted = self.forecasts.lock().get(&lat.to_string()).cloned();
        match scripted {
            Some(s) => {
                tokio::time::sleep(s.delay).await;
                s.result
            }
            None => Err(FetchError::EmptyResult),
        }
    }
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

pub fn suggestion(label: &str, lat: f64, lon: f64) -> Suggestion {
    Suggestion {
        label: label.to_string(),
        lat,
        lon,
    }
}

pub fn connection_refused() -> FetchError {
    FetchError::Network(NetworkError::ConnectionFailed("connection refused".into()))
}

pub fn live_result(label: &str, advisories: Vec<cropwise_advisory::Advisory>) -> AdvisoryResult {
    AdvisoryResult {
        advisories,
        location_label: label.to_string(),
        source: AdvisorySource::Live,
    }
}

pub fn series(days: usize) -> ForecastSeries {
    let daily = (0..days)
        .map(|i| DayPoint {
            dt: 1_700_000_000 + (i as i64) * 86_400,
            t_min: 3.0 + i as f64,
            t_max: 12.0 + i as f64,
            rain_mm: 1.5,
            pop: 0.4,
        })
        .collect();
    ForecastSeries::from_points(daily)
}
