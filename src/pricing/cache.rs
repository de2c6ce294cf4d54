use std::sync::Arc;
use std::time::{Duration, Instant};
use dashmap::DashMap;

use crate::error::{Error, Result};
use crate::interfaces::{HistoryWindow, PriceHistorySource};
use crate::observability::metrics::{PRICE_CACHE_HITS, PRICE_CACHE_MISSES};
use crate::types::PriceSeries;

/// Full-history payload for one coin as fetched at `fetched_at`.
#[derive(Clone, Debug)]
pub struct CachedPriceEntry {
    pub coin_id: String,
    pub fetched_at: Instant,
    pub series: Arc<PriceSeries>,
}

impl CachedPriceEntry {
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Process-lifetime price history cache keyed by coin id.
///
/// Entries are replaced wholesale and never evicted; a stale entry just stops
/// being served. No lock is held while fetching, so two requests racing on a
/// cold coin both go upstream and the later insert wins.
pub struct PriceSeriesCache {
    source: Arc<dyn PriceHistorySource>,
    entries: DashMap<String, CachedPriceEntry>,
    ttl: Duration,
}

impl PriceSeriesCache {
    pub fn new(source: Arc<dyn PriceHistorySource>, ttl: Duration) -> Self {
        PriceSeriesCache {
            source,
            entries: DashMap::new(),
            ttl,
        }
    }

    pub async fn get_price_series(&self, coin_id: &str) -> Result<Arc<PriceSeries>> {
        if let Some(entry) = self.fresh_entry(coin_id) {
            PRICE_CACHE_HITS.inc();
            tracing::info!("Serving {} from cache", coin_id);
            return Ok(entry.series);
        }

        PRICE_CACHE_MISSES.inc();
        let raw = match self.source.market_chart(coin_id, HistoryWindow::Max).await {
            Err(failure) if failure.is_unauthorized() => {
                tracing::info!("401 on max history for {}, retrying with 365 days", coin_id);
                self.source.market_chart(coin_id, HistoryWindow::Days365).await?
            }
            other => other?,
        };

        let series: PriceSeries = serde_json::from_value(raw)
            .map_err(|e| Error::MalformedUpstreamPayload(e.to_string()))?;
        let series = Arc::new(series);

        self.entries.insert(coin_id.to_string(), CachedPriceEntry {
            coin_id: coin_id.to_string(),
            fetched_at: Instant::now(),
            series: Arc::clone(&series),
        });
        tracing::info!("Cached {} price history", coin_id);

        Ok(series)
    }

    fn fresh_entry(&self, coin_id: &str) -> Option<CachedPriceEntry> {
        self.entries
            .get(coin_id)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.value().clone())
    }
}
