pub mod client;
pub mod ratio_api;
pub mod live_ratio_api;
pub mod price_api;

use thiserror::Error;

pub use client::UpstreamClient;
pub use live_ratio_api::HttpLiveRatioSource;
pub use price_api::PriceApi;
pub use ratio_api::RatioApi;

/// Outcome of a failed upstream call, returned as a value so callers can
/// branch on it (the price API's 401 fallback does).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HttpFailure {
    #[error("upstream failed with status code {status}")]
    Status { status: u16, body: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl HttpFailure {
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpFailure::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
