use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::error::{Error, Result};
use crate::interfaces::{HistoryWindow, PriceHistorySource};
use crate::upstream::{HttpFailure, UpstreamClient};

/// `GET {base}/coins/{coin}/market_chart?vs_currency=usd&days=..`
pub struct PriceApi {
    client: UpstreamClient,
    base: Url,
    api_key: Option<(String, String)>,
}

impl PriceApi {
    pub fn new(client: UpstreamClient, config: &UpstreamConfig) -> Result<Self> {
        let base = Url::parse(&config.price_api_base)
            .map_err(|e| Error::ConfigError(format!("price_api_base: {}", e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::ConfigError(format!(
                "price_api_base is not a base URL: {}",
                config.price_api_base
            )));
        }

        let api_key = config.price_api_key
            .as_ref()
            .filter(|key| !key.is_empty())
            .map(|key| (config.price_api_key_header.clone(), key.clone()));

        Ok(PriceApi { client, base, api_key })
    }

    pub fn market_chart_url(&self, coin_id: &str, window: HistoryWindow) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["coins", coin_id, "market_chart"]);
        }
        url.query_pairs_mut()
            .append_pair("vs_currency", "usd")
            .append_pair("days", window.as_query());
        url
    }
}

#[async_trait]
impl PriceHistorySource for PriceApi {
    async fn market_chart(
        &self,
        coin_id: &str,
        window: HistoryWindow,
    ) -> std::result::Result<Value, HttpFailure> {
        let url = self.market_chart_url(coin_id, window);
        tracing::info!("Fetching price history: {}", url);

        let headers: Vec<(&str, &str)> = self.api_key
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();

        self.client.fetch_json(url.as_str(), &headers).await
    }
}
