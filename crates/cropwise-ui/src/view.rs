//! View state handed to renderers.
//!
//! Each panel is exactly one of: guidance to pick a location, a loading
//! indicator, content, or an empty/degraded message.

use chrono::DateTime;
use cropwise_advisory::{Advisory, AdvisoryResult, DayPoint, ForecastSeries};
use cropwise_core::FetchState;

use crate::services::AdvisoryOrchestrator;

pub const PICK_LOCATION: &str = "Missing parameters. Please select a location and crop.";
pub const LOADING: &str = "Loading…";
pub const NO_ADVISORIES: &str = "No specific advisories today.";
pub const NO_FORECAST: &str = "No forecast series available for this location.";

#[derive(Debug, Clone, PartialEq)]
pub enum AdvisoryPanel<'a> {
    PickLocation,
    Loading,
    Advisories {
        label: &'a str,
        items: &'a [Advisory],
        /// Built-in advisories shown because the live fetch failed
        fallback: bool,
    },
    NoAdvisories {
        label: &'a str,
    },
    Unavailable(&'a str),
}

impl<'a> AdvisoryPanel<'a> {
    pub fn new(incomplete: bool, state: &'a FetchState<AdvisoryResult>) -> Self {
        if incomplete {
            return Self::PickLocation;
        }
        match state {
            FetchState::Idle => Self::PickLocation,
            FetchState::Loading => Self::Loading,
            FetchState::Ready(result) if result.advisories.is_empty() => Self::NoAdvisories {
                label: &result.location_label,
            },
            FetchState::Ready(result) => Self::Advisories {
                label: &result.location_label,
                items: &result.advisories,
                fallback: result.is_fallback(),
            },
            FetchState::Failed(reason) => Self::Unavailable(reason),
        }
    }

    pub fn from_orchestrator(orchestrator: &'a AdvisoryOrchestrator) -> Self {
        Self::new(orchestrator.is_incomplete(), orchestrator.advisory_state())
    }

    /// Resolved location label, when there is one.
    pub fn label(&self) -> Option<&'a str> {
        match self {
            Self::Advisories { label, .. } | Self::NoAdvisories { label } => Some(*label),
            _ => None,
        }
    }

    /// Status line for panels without advisory cards.
    pub fn message(&self) -> Option<&'a str> {
        match self {
            Self::PickLocation => Some(PICK_LOCATION),
            Self::Loading => Some(LOADING),
            Self::NoAdvisories { .. } => Some(NO_ADVISORIES),
            Self::Unavailable(reason) => Some(*reason),
            Self::Advisories { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForecastPanel<'a> {
    PickLocation,
    Loading,
    Chart(&'a [DayPoint]),
    NotAvailable,
}

impl<'a> ForecastPanel<'a> {
    pub fn new(incomplete: bool, state: &'a FetchState<ForecastSeries>) -> Self {
        if incomplete {
            return Self::PickLocation;
        }
        match state {
            FetchState::Idle => Self::PickLocation,
            FetchState::Loading => Self::Loading,
            FetchState::Ready(series) if !series.is_empty() => Self::Chart(&series.daily),
            FetchState::Ready(_) | FetchState::Failed(_) => Self::NotAvailable,
        }
    }

    pub fn from_orchestrator(orchestrator: &'a AdvisoryOrchestrator) -> Self {
        Self::new(orchestrator.is_incomplete(), orchestrator.forecast_state())
    }

    pub fn chart_points(&self) -> Vec<ChartPoint> {
        match self {
            Self::Chart(daily) => daily.iter().map(ChartPoint::from).collect(),
            _ => Vec::new(),
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::PickLocation => Some(PICK_LOCATION),
            Self::Loading => Some(LOADING),
            Self::NotAvailable => Some(NO_FORECAST),
            Self::Chart(_) => None,
        }
    }
}

/// One chart column
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    /// Short weekday, e.g. "Tue"
    pub day: String,
    pub t_min: i32,
    pub t_max: i32,
    pub rain_mm: f64,
    /// Probability of precipitation, 0..=100
    pub pop_percent: u8,
}

impl From<&DayPoint> for ChartPoint {
    fn from(point: &DayPoint) -> Self {
        let day = DateTime::from_timestamp(point.dt, 0)
            .map(|dt| dt.format("%a").to_string())
            .unwrap_or_default();
        Self {
            day,
            t_min: point.t_min.round() as i32,
            t_max: point.t_max.round() as i32,
            rain_mm: point.rain_mm,
            pop_percent: (point.pop.clamp(0.0, 1.0) * 100.0).round() as u8,
        }
    }
}
