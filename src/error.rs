use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::upstream::HttpFailure;

#[derive(Error, Debug)]
pub enum Error {
    // Request Errors
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter {
        name: &'static str,
        value: String,
    },

    // Upstream Errors
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Upstream failed with status code {status}")]
    UpstreamRejected {
        status: u16,
        body: String,
    },

    #[error("Malformed upstream payload: {0}")]
    MalformedUpstreamPayload(String),

    // Durable Store Errors
    #[error("Durable store unavailable: {0}")]
    DurableStoreUnavailable(String),

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingParameter(_) | Error::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<HttpFailure> for Error {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::Status { status, body } => Error::UpstreamRejected { status, body },
            HttpFailure::Transport(detail) => Error::UpstreamUnavailable(detail),
            HttpFailure::Malformed(detail) => Error::MalformedUpstreamPayload(detail),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_errors_map_to_bad_request() {
        assert_eq!(Error::MissingParameter("coin").status_code(), StatusCode::BAD_REQUEST);
        let invalid = Error::InvalidParameter { name: "from", value: "abc".to_string() };
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_failures_map_to_server_error() {
        let err: Error = HttpFailure::Status { status: 503, body: String::new() }.into();
        assert!(matches!(err, Error::UpstreamRejected { status: 503, .. }));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: Error = HttpFailure::Transport("connection reset".to_string()).into();
        assert!(matches!(err, Error::UpstreamUnavailable(_)));

        let err: Error = HttpFailure::Malformed("expected value".to_string()).into();
        assert!(matches!(err, Error::MalformedUpstreamPayload(_)));
    }
}
