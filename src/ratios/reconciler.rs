use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::filter::{filter_window, TimeWindow};
use crate::interfaces::BlobStore;
use crate::observability::metrics::LIVE_PATCHES;
use crate::ratios::durable::DurableRatioCache;
use crate::ratios::live::LiveRatioCache;
use crate::ratios::merge::{merge_cached, missing_today, trim_trailing_sentinels};
use crate::types::timestamp::iso_instant;
use crate::types::{AssetRatioSeries, DailyRatio, LiveRatioSnapshot, SENTINEL_RATIO};

/// Upstream ratio snapshot after reconciliation.
#[derive(Clone, Debug)]
pub struct ReconciledSnapshot {
    payload: Value,
    pub assets: Vec<AssetRatioSeries>,
    pub live_patches: usize,
    pub cache_persisted: bool,
}

impl ReconciledSnapshot {
    fn passthrough(payload: Value) -> Self {
        ReconciledSnapshot {
            payload,
            assets: Vec::new(),
            live_patches: 0,
            cache_persisted: false,
        }
    }

    pub fn series(&self, asset_key: &str) -> Option<&[DailyRatio]> {
        self.assets
            .iter()
            .find(|asset| asset.asset_key == asset_key)
            .map(|asset| asset.daily_ratios.as_slice())
    }

    /// The upstream payload with every reconciled asset's `dailyRatios`
    /// replaced, windowed when a window is given. Everything else in the
    /// payload is left as received.
    pub fn render(self, window: Option<&TimeWindow>) -> Value {
        let mut payload = self.payload;

        for asset in &self.assets {
            let Some(target) = asset_object_mut(&mut payload, &asset.asset_key) else {
                continue;
            };
            let visible = filter_window(&asset.daily_ratios, window);
            match serde_json::to_value(&visible) {
                Ok(series) => {
                    target.insert("dailyRatios".to_string(), series);
                }
                Err(e) => {
                    tracing::warn!("Could not render ratios for {}: {}", asset.asset_key, e);
                }
            }
        }

        payload
    }
}

/// Cleans and extends the upstream ratio snapshot.
///
/// Per asset: strip the trailing run of sentinel entries, append durable-cache
/// days the upstream has not published yet, then patch today's value from
/// the live feed. Patched values are recorded in the durable cache, which is
/// written back once per reconciliation.
pub struct RatioReconciler {
    store: Arc<dyn BlobStore>,
    cache_key: String,
    live: Option<Arc<LiveRatioCache>>,
}

impl RatioReconciler {
    pub fn new(
        store: Arc<dyn BlobStore>,
        cache_key: impl Into<String>,
        live: Option<Arc<LiveRatioCache>>,
    ) -> Self {
        RatioReconciler {
            store,
            cache_key: cache_key.into(),
            live,
        }
    }

    pub async fn reconcile(&self, payload: Value, now: DateTime<Utc>) -> ReconciledSnapshot {
        let asset_keys: Vec<String> = match payload.pointer("/data/assets").and_then(Value::as_object) {
            Some(assets) => assets.keys().cloned().collect(),
            None => Vec::new(),
        };
        if asset_keys.is_empty() {
            tracing::debug!("Ratio payload has no assets, passing through");
            return ReconciledSnapshot::passthrough(payload);
        }

        let mut durable = DurableRatioCache::load(self.store.as_ref(), &self.cache_key).await;
        let today = now.date_naive();
        let mut live: Option<Option<Arc<LiveRatioSnapshot>>> = None;
        let mut assets = Vec::with_capacity(asset_keys.len());
        let mut live_patches = 0;

        for asset_key in asset_keys {
            let Some(mut series) = parse_daily_ratios(&payload, &asset_key) else {
                continue;
            };

            trim_trailing_sentinels(&mut series);
            if series.last().is_some_and(|last| last.calendar_date().is_none()) {
                tracing::warn!("Last {} date is unreadable, ordering by the latest readable one", asset_key);
            }
            let merged = merge_cached(&mut series, durable.entries(&asset_key));
            if merged > 0 {
                tracing::debug!("Merged {} cached days into {}", merged, asset_key);
            }

            if missing_today(&series, today) {
                if live.is_none() {
                    live = Some(self.live_snapshot().await);
                }
                let current = live
                    .as_ref()
                    .and_then(|snapshot| snapshot.as_ref())
                    .and_then(|snapshot| snapshot.ratio_for(&asset_key))
                    .filter(|ratio| *ratio != SENTINEL_RATIO);

                if let Some(ratio) = current {
                    let entry = DailyRatio::new(iso_instant(now), ratio);
                    durable.record(&asset_key, entry.clone());
                    series.push(entry);
                    live_patches += 1;
                    LIVE_PATCHES.inc();
                    tracing::info!("Patched today's {} ratio from live feed: {}", asset_key, ratio);
                }
            }

            assets.push(AssetRatioSeries {
                asset_key,
                daily_ratios: series,
            });
        }

        let cache_persisted = durable.persist(self.store.as_ref(), &self.cache_key).await;

        ReconciledSnapshot {
            payload,
            assets,
            live_patches,
            cache_persisted,
        }
    }

    async fn live_snapshot(&self) -> Option<Arc<LiveRatioSnapshot>> {
        match &self.live {
            Some(cache) => cache.current().await,
            None => None,
        }
    }
}

fn parse_daily_ratios(payload: &Value, asset_key: &str) -> Option<Vec<DailyRatio>> {
    let raw = payload
        .get("data")?
        .get("assets")?
        .get(asset_key)?
        .get("dailyRatios")?;

    match serde_json::from_value(raw.clone()) {
        Ok(series) => Some(series),
        Err(e) => {
            tracing::warn!("Leaving {} untouched, unreadable dailyRatios: {}", asset_key, e);
            None
        }
    }
}

fn asset_object_mut<'a>(payload: &'a mut Value, asset_key: &str) -> Option<&'a mut Map<String, Value>> {
    payload
        .get_mut("data")?
        .get_mut("assets")?
        .get_mut(asset_key)?
        .as_object_mut()
}
