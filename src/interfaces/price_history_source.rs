use async_trait::async_trait;
use serde_json::Value;
use crate::upstream::HttpFailure;

/// How much history to request from the price API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryWindow {
    Max,
    Days365,
}

impl HistoryWindow {
    pub fn as_query(&self) -> &'static str {
        match self {
            HistoryWindow::Max => "max",
            HistoryWindow::Days365 => "365",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    /// Raw `market_chart` payload for `coin_id` quoted in USD.
    async fn market_chart(&self, coin_id: &str, window: HistoryWindow) -> Result<Value, HttpFailure>;
}
