use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Error, Result};
use crate::interfaces::LiveRatioSource;
use crate::types::ratio::LiveRatioPayload;
use crate::types::LiveRatioSnapshot;
use crate::upstream::UpstreamClient;

pub struct HttpLiveRatioSource {
    client: UpstreamClient,
    url: String,
}

impl HttpLiveRatioSource {
    pub fn new(client: UpstreamClient, url: impl Into<String>) -> Self {
        HttpLiveRatioSource {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl LiveRatioSource for HttpLiveRatioSource {
    async fn fetch_live(&self) -> Result<LiveRatioSnapshot> {
        let raw = self.client.fetch_json(&self.url, &[]).await?;
        let payload: LiveRatioPayload = serde_json::from_value(raw)
            .map_err(|e| Error::MalformedUpstreamPayload(e.to_string()))?;

        Ok(payload.into_snapshot(Utc::now()))
    }
}
