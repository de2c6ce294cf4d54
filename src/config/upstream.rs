use std::time::Duration;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub ratio_url: String,
    /// Current-ratio feed; without it "today" is never patched.
    pub live_ratio_url: Option<String>,
    pub price_api_base: String,
    pub price_api_key: Option<String>,
    pub price_api_key_header: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            ratio_url: "https://app.strikefinance.org/api/perpetuals/getHistoricalRatios".to_string(),
            live_ratio_url: None,
            price_api_base: "https://api.coingecko.com/api/v3".to_string(),
            price_api_key: None,
            price_api_key_header: "x-cg-demo-api-key".to_string(),
            user_agent: concat!("ratio-proxy/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
        }
    }
}
