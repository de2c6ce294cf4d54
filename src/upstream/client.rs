use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::error::{Error, Result};
use crate::observability::metrics::UPSTREAM_REQUESTS;
use crate::upstream::HttpFailure;

/// Outbound JSON GETs. Non-2xx answers come back as `HttpFailure::Status`,
/// never as a transport error, and nothing is retried here.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(UpstreamClient { client })
    }

    pub async fn fetch_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> std::result::Result<Value, HttpFailure> {
        let target = metric_target(url);
        let result = self.do_fetch(url, headers).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(HttpFailure::Status { .. }) => "rejected",
            Err(HttpFailure::Transport(_)) => "unavailable",
            Err(HttpFailure::Malformed(_)) => "malformed",
        };
        UPSTREAM_REQUESTS.with_label_values(&[target.as_str(), outcome]).inc();

        result
    }

    async fn do_fetch(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> std::result::Result<Value, HttpFailure> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send()
            .await
            .map_err(|e| HttpFailure::Transport(e.to_string()))?;
        let status = response.status();
        tracing::debug!("GET {} -> {}", url, status);

        let body = response.text()
            .await
            .map_err(|e| HttpFailure::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!("Upstream {} answered {}: {}", url, status, truncate(&body, 200));
            return Err(HttpFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| HttpFailure::Malformed(e.to_string()))
    }
}

/// Host of the URL, used as the metrics label.
fn metric_target(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
