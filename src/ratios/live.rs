use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::interfaces::LiveRatioSource;
use crate::types::LiveRatioSnapshot;

/// Short-lived cache of the current-ratio feed.
///
/// The slot is only locked to read or swap the `Arc`, never across the fetch.
pub struct LiveRatioCache {
    source: Arc<dyn LiveRatioSource>,
    ttl: Duration,
    slot: RwLock<Option<(Instant, Arc<LiveRatioSnapshot>)>>,
}

impl LiveRatioCache {
    pub fn new(source: Arc<dyn LiveRatioSource>, ttl: Duration) -> Self {
        LiveRatioCache {
            source,
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Cached snapshot if younger than the TTL, else a fresh fetch. Fetch
    /// failures mean "no live data" and leave the previous slot untouched.
    pub async fn current(&self) -> Option<Arc<LiveRatioSnapshot>> {
        if let Some(snapshot) = self.cached() {
            return Some(snapshot);
        }

        match self.source.fetch_live().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                if let Ok(mut slot) = self.slot.write() {
                    *slot = Some((Instant::now(), Arc::clone(&snapshot)));
                }
                tracing::debug!("Live ratio snapshot refreshed ({} assets)", snapshot.ratios.len());
                Some(snapshot)
            }
            Err(e) => {
                tracing::warn!("Live ratio fetch failed, treating as no live data: {}", e);
                None
            }
        }
    }

    fn cached(&self) -> Option<Arc<LiveRatioSnapshot>> {
        let slot = self.slot.read().ok()?;
        slot.as_ref()
            .filter(|(fetched_at, _)| fetched_at.elapsed() < self.ttl)
            .map(|(_, snapshot)| Arc::clone(snapshot))
    }
}
