//! Cropwise orchestration layer
//!
//! The suggestion fetcher and advisory orchestrator own their state and a
//! message channel; async work runs on a tokio runtime handle passed in at
//! construction.

pub mod services;
pub mod view;

pub use services::{AdvisoryMessage, AdvisoryOrchestrator, SuggestionFetcher, SuggestionMessage};
pub use view::{AdvisoryPanel, ChartPoint, ForecastPanel};
