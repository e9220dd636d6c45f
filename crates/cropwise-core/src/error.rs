//! Error hierarchy for Cropwise.
//!
//! `Display` keeps the detail for logs; `user_message()` is what a panel or
//! the terminal shows.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "Could not read or write a local file.",
            AppError::Other(_) => "Something went wrong. Please try again.",
        }
    }
}

/// Failures talking to the advisory service.
#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => "The advisory service could not be reached.",
            NetworkError::Timeout => "The advisory service timed out.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The advisory service is having trouble right now."
            }
            NetworkError::ServerError { .. } => "The advisory service rejected the request.",
            NetworkError::InvalidResponse(_) => "The advisory service sent data we could not read.",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Parse { .. } => "The config file is not valid TOML.",
            ConfigError::Invalid(_) => "The config file has invalid settings.",
        }
    }
}

/// Maps reqwest transport errors onto [`NetworkError`].
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            return NetworkError::Timeout;
        }
        match self.status() {
            Some(status) => NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            },
            None if self.is_decode() => NetworkError::InvalidResponse(self.to_string()),
            None => NetworkError::ConnectionFailed(self.to_string()),
        }
    }
}
