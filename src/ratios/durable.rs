use std::collections::BTreeMap;
use serde_json::{Map, Value};

use crate::interfaces::BlobStore;
use crate::observability::metrics::{DURABLE_CACHE_FAILURES, DURABLE_CACHE_WRITES};
use crate::ratios::merge::contains_day;
use crate::types::timestamp::same_calendar_day;
use crate::types::DailyRatio;

/// In-memory copy of the persisted `asset -> [DailyRatio]` document.
///
/// Loaded once per reconciliation, written back in one overwrite only when
/// something was appended. Assets with entries that do not parse are kept
/// verbatim and written back as stored, plus any appended entries. When the
/// document itself could not be loaded or read, the copy is never written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DurableRatioCache {
    assets: BTreeMap<String, Vec<DailyRatio>>,
    unreadable: Map<String, Value>,
    read_only: bool,
    dirty: bool,
}

impl DurableRatioCache {
    /// Best-effort load: any failure leaves an empty, read-only cache.
    pub async fn load(store: &dyn BlobStore, key: &str) -> Self {
        match store.load(key).await {
            Ok(Some(document)) => Self::from_document(document),
            Ok(None) => Self::default(),
            Err(e) => {
                DURABLE_CACHE_FAILURES.inc();
                tracing::warn!("Durable ratio cache load failed, continuing without it: {}", e);
                Self::detached()
            }
        }
    }

    pub fn from_document(document: Value) -> Self {
        let Value::Object(stored) = document else {
            tracing::warn!("Durable ratio cache is not an object, leaving it as stored");
            return Self::detached();
        };

        let mut cache = Self::default();
        for (asset_key, value) in stored {
            if let Ok(series) = serde_json::from_value::<Vec<DailyRatio>>(value.clone()) {
                cache.assets.insert(asset_key, series);
                continue;
            }

            tracing::warn!("Durable ratio cache has unreadable entries for {}, keeping them as stored", asset_key);
            let readable: Vec<DailyRatio> = value
                .as_array()
                .map(|items| {
                    items.iter()
                        .filter_map(|item| serde_json::from_value(item.clone()).ok())
                        .collect()
                })
                .unwrap_or_default();
            cache.assets.insert(asset_key.clone(), readable);
            cache.unreadable.insert(asset_key, value);
        }
        cache
    }

    fn detached() -> Self {
        DurableRatioCache {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn to_document(&self) -> Value {
        let mut document = Map::new();
        for (asset_key, series) in &self.assets {
            if let Some(raw) = self.unreadable.get(asset_key) {
                document.insert(asset_key.clone(), raw.clone());
                continue;
            }
            match serde_json::to_value(series) {
                Ok(value) => {
                    document.insert(asset_key.clone(), value);
                }
                Err(e) => tracing::warn!("Could not serialize cached ratios for {}: {}", asset_key, e),
            }
        }
        Value::Object(document)
    }

    /// Readable cached entries for an asset.
    pub fn entries(&self, asset_key: &str) -> &[DailyRatio] {
        self.assets.get(asset_key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Appends `entry` unless the asset already has a value for that day.
    pub fn record(&mut self, asset_key: &str, entry: DailyRatio) -> bool {
        if contains_day(self.entries(asset_key), &entry.date) {
            return false;
        }

        if let Some(raw) = self.unreadable.get_mut(asset_key) {
            let Some(items) = raw.as_array_mut() else {
                return false;
            };
            let taken = items
                .iter()
                .filter_map(|item| item.get("date").and_then(Value::as_str))
                .any(|date| same_calendar_day(date, &entry.date));
            if taken {
                return false;
            }
            let Ok(value) = serde_json::to_value(&entry) else {
                return false;
            };
            items.push(value);
        }

        self.assets.entry(asset_key.to_string()).or_default().push(entry);
        self.dirty = true;
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Writes the whole document when dirty. Failures are logged and swallowed.
    pub async fn persist(&mut self, store: &dyn BlobStore, key: &str) -> bool {
        if !self.dirty {
            return false;
        }
        if self.read_only {
            tracing::warn!("Durable ratio cache was not loaded, skipping write");
            return false;
        }

        match store.save(key, &self.to_document()).await {
            Ok(()) => {
                DURABLE_CACHE_WRITES.inc();
                self.dirty = false;
                tracing::info!("Durable ratio cache written ({} assets)", self.assets.len());
                true
            }
            Err(e) => {
                DURABLE_CACHE_FAILURES.inc();
                tracing::warn!("Durable ratio cache write failed: {}", e);
                false
            }
        }
    }
}
