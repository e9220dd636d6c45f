pub mod advisory_service;
pub mod suggestion_service;

pub use advisory_service::{AdvisoryMessage, AdvisoryOrchestrator};
pub use suggestion_service::{SuggestionFetcher, SuggestionMessage};
