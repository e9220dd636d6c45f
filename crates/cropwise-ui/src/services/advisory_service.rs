//! Advisory backend: the advisory and forecast fetches for one key.
//! Both fetches run on the runtime and report back via mpsc; the owner
//! applies the fallback policy and discards results for abandoned keys.

use std::sync::Arc;

use cropwise_advisory::{
    coordinate_label, fallback_result, AdvisoryApi, AdvisoryResult, AdvisorySource, FetchError,
    FetchErrorKind, ForecastSeries, KeyParams, OrchestrationKey,
};
use cropwise_core::{FetchState, FetchTag, LatestSlot, Ticket};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Messages sent from async operations back to the owner
#[derive(Debug)]
pub enum AdvisoryMessage {
    /// Result of the advisory fetch for `key`
    AdvisoryDone {
        ticket: Ticket,
        key: OrchestrationKey,
        result: Result<AdvisoryResult, FetchError>,
    },
    /// Result of the forecast fetch
    ForecastDone {
        ticket: Ticket,
        result: Result<ForecastSeries, FetchError>,
    },
}

pub struct AdvisoryOrchestrator {
    api: Arc<dyn AdvisoryApi>,
    runtime: Handle,
    /// `None` while the presented key is incomplete
    key: Option<OrchestrationKey>,
    advisory: LatestSlot<AdvisoryResult>,
    forecast: LatestSlot<ForecastSeries>,
    tx: mpsc::UnboundedSender<AdvisoryMessage>,
    rx: mpsc::UnboundedReceiver<AdvisoryMessage>,
}

impl AdvisoryOrchestrator {
    pub fn new(api: Arc<dyn AdvisoryApi>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            runtime,
            key: None,
            advisory: LatestSlot::new(),
            forecast: LatestSlot::new(),
            tx,
            rx,
        }
    }

    /// Key that produced the current state.
    pub fn key(&self) -> Option<&OrchestrationKey> {
        self.key.as_ref()
    }

    /// No complete key has been presented; nothing is being fetched.
    pub fn is_incomplete(&self) -> bool {
        self.key.is_none()
    }

    pub fn advisory_state(&self) -> &FetchState<AdvisoryResult> {
        self.advisory.state()
    }

    pub fn forecast_state(&self) -> &FetchState<ForecastSeries> {
        self.forecast.state()
    }

    pub fn advisory_tag(&self) -> FetchTag {
        self.advisory.state().tag()
    }

    pub fn forecast_tag(&self) -> FetchTag {
        self.forecast.state().tag()
    }

    pub fn is_pending(&self) -> bool {
        self.advisory.state().is_loading() || self.forecast.state().is_loading()
    }

    /// Present the key fields carried by navigation.
    ///
    /// Returns `true` when fetches were issued. An incomplete key abandons
    /// any in-flight fetches; a key equal to the current one does nothing.
    pub fn present(&mut self, params: &KeyParams) -> bool {
        let Some(key) = params.complete() else {
            if self.key.take().is_some() {
                tracing::debug!("Key incomplete; abandoning advisory and forecast");
            }
            self.advisory.reset();
            self.forecast.reset();
            return false;
        };

        if self.key.as_ref() == Some(&key) {
            tracing::debug!("Key unchanged ({}); no fetch", key);
            return false;
        }

        tracing::info!("Fetching advisory and forecast for {}", key);
        let (advisory_ticket, _) = self.advisory.issue();
        let (forecast_ticket, _) = self.forecast.issue();
        self.spawn_advisory(advisory_ticket, key.clone());
        self.spawn_forecast(forecast_ticket, key.lat, key.lon);
        self.key = Some(key);
        true
    }

    /// Wait for the next message and apply it. Returns `true` when a slot
    /// changed.
    pub async fn process_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(msg) => self.apply(msg),
            None => false,
        }
    }

    /// Apply every message already queued without waiting.
    pub fn try_process(&mut self) -> bool {
        let mut changed = false;
        while let Ok(msg) = self.rx.try_recv() {
            changed |= self.apply(msg);
        }
        changed
    }

    /// Process messages until neither slot is loading.
    pub async fn settle(&mut self) {
        while self.is_pending() {
            self.process_next().await;
        }
    }

    fn apply(&mut self, msg: AdvisoryMessage) -> bool {
        match msg {
            AdvisoryMessage::AdvisoryDone {
                ticket,
                key,
                result,
            } => {
                if !self.advisory.is_current(ticket) {
                    tracing::debug!("Discarding advisory for abandoned key {}", key);
                    return false;
                }
                let resolved = resolve_advisory(&key, result);
                self.advisory.settle(ticket, Ok(resolved))
            }
            AdvisoryMessage::ForecastDone { ticket, result } => {
                if !self.forecast.is_current(ticket) {
                    tracing::debug!("Discarding forecast {} for abandoned key", ticket);
                    return false;
                }
                let series = result.unwrap_or_else(|e| {
                    if e.kind() != FetchErrorKind::EmptyResult {
                        tracing::warn!("Forecast fetch failed: {}", e);
                    }
                    ForecastSeries::empty()
                });
                self.forecast.settle(ticket, Ok(series))
            }
        }
    }

    fn spawn_advisory(&self, ticket: Ticket, key: OrchestrationKey) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.fetch_advisory(&key).await;
            let _ = tx.send(AdvisoryMessage::AdvisoryDone {
                ticket,
                key,
                result,
            });
        });
    }

    fn spawn_forecast(&self, ticket: Ticket, lat: f64, lon: f64) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.fetch_forecast(lat, lon).await;
            let _ = tx.send(AdvisoryMessage::ForecastDone { ticket, result });
        });
    }
}

/// Failed fetches become the built-in advisories; an empty response stays
/// live content with no advisories.
fn resolve_advisory(
    key: &OrchestrationKey,
    result: Result<AdvisoryResult, FetchError>,
) -> AdvisoryResult {
    match result {
        Ok(result) => result,
        Err(FetchError::EmptyResult) => AdvisoryResult {
            advisories: Vec::new(),
            location_label: coordinate_label(key.lat, key.lon),
            source: AdvisorySource::Live,
        },
        Err(e) => {
            tracing::warn!(
                "Advisory fetch for {} failed ({}); showing built-in advisories",
                key,
                e
            );
            fallback_result(key)
        }
    }
}
