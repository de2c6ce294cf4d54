use std::sync::Arc;

use crate::config::{AppConfig, PricingConfig};
use crate::error::Result;
use crate::interfaces::{BlobStore, LiveRatioSource, PriceHistorySource};
use crate::pricing::PriceSeriesCache;
use crate::ratios::{LiveRatioCache, RatioReconciler};
use crate::store;
use crate::upstream::{HttpLiveRatioSource, PriceApi, RatioApi, UpstreamClient};

/// Everything a request handler touches. Shared across requests behind an `Arc`.
pub struct ApiState {
    pub ratios: RatioApi,
    pub reconciler: RatioReconciler,
    pub prices: PriceSeriesCache,
    pub pricing: PricingConfig,
}

impl ApiState {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = store::from_config(&config.store)?;
        Self::with_store(config, store)
    }

    /// Wires the upstream clients and caches around an already-built store.
    pub fn with_store(config: &AppConfig, store: Arc<dyn BlobStore>) -> Result<Self> {
        let client = UpstreamClient::new(&config.upstream)?;

        let live = config.upstream.live_ratio_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| {
                let source: Arc<dyn LiveRatioSource> =
                    Arc::new(HttpLiveRatioSource::new(client.clone(), url));
                Arc::new(LiveRatioCache::new(source, config.cache.live_ttl()))
            });
        if live.is_none() {
            tracing::warn!("No live ratio feed configured, today's values will not be patched");
        }

        let price_source: Arc<dyn PriceHistorySource> =
            Arc::new(PriceApi::new(client.clone(), &config.upstream)?);

        Ok(ApiState {
            ratios: RatioApi::new(client, config.upstream.ratio_url.clone()),
            reconciler: RatioReconciler::new(store, config.store.cache_key.clone(), live),
            prices: PriceSeriesCache::new(price_source, config.cache.price_ttl()),
            pricing: config.pricing.clone(),
        })
    }
}
