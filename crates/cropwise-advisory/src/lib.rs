//! Advisory service client for Cropwise
//!
//! Domain types, the remote API seam and the built-in fallback advisories.

pub mod client;
pub mod error;
pub mod fallback;
pub mod types;

pub use client::{AdvisoryApi, ApiClient};
pub use error::{FetchError, FetchErrorKind};
pub use fallback::{coordinate_label, fallback_advisories, fallback_result};
pub use types::*;
