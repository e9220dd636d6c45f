//! Fetch error taxonomy shared by every remote call.

use cropwise_core::{AppError, NetworkError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The request never produced a response (connect failure, timeout).
    #[error("Network failure: {0}")]
    Network(#[from] NetworkError),

    /// Non-success status or a body that does not have the expected shape.
    #[error("Bad response: {0}")]
    BadResponse(String),

    /// The body parsed but carried nothing usable.
    #[error("Response contained no usable data")]
    EmptyResult,
}

/// Payload-free classification of a [`FetchError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    NetworkFailure,
    BadResponse,
    EmptyResult,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Network(_) => FetchErrorKind::NetworkFailure,
            Self::BadResponse(_) => FetchErrorKind::BadResponse,
            Self::EmptyResult => FetchErrorKind::EmptyResult,
        }
    }

    /// User-friendly error message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(e) => e.user_message(),
            Self::BadResponse(_) => "The advisory service returned an unexpected response.",
            Self::EmptyResult => "No data is available for this location.",
        }
    }
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Network(n) => AppError::Network(n),
            FetchError::BadResponse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
            FetchError::EmptyResult => AppError::Other(anyhow::anyhow!("empty result")),
        }
    }
}
