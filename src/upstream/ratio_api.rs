use serde_json::Value;
use crate::upstream::{HttpFailure, UpstreamClient};

/// Historical perpetuals ratios, `{ success, data: { assets } }`.
#[derive(Clone)]
pub struct RatioApi {
    client: UpstreamClient,
    url: String,
}

impl RatioApi {
    pub fn new(client: UpstreamClient, url: impl Into<String>) -> Self {
        RatioApi {
            client,
            url: url.into(),
        }
    }

    pub async fn fetch_snapshot(&self) -> Result<Value, HttpFailure> {
        self.client.fetch_json(&self.url, &[]).await
    }
}
