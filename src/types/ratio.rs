use std::collections::HashMap;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::timestamp::calendar_date;

/// Placeholder ratio meaning "no observation".
pub const SENTINEL_RATIO: f64 = 1.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyRatio {
    pub date: String,
    pub ratio: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DailyRatio {
    pub fn new(date: impl Into<String>, ratio: f64) -> Self {
        DailyRatio {
            date: date.into(),
            ratio,
            extra: Map::new(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.ratio == SENTINEL_RATIO
    }

    pub fn calendar_date(&self) -> Option<NaiveDate> {
        calendar_date(&self.date)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssetRatioSeries {
    pub asset_key: String,
    pub daily_ratios: Vec<DailyRatio>,
}

/// Point sample of the current-ratio feed.
#[derive(Clone, Debug, PartialEq)]
pub struct LiveRatioSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub ratios: HashMap<String, f64>,
}

impl LiveRatioSnapshot {
    /// Exact key first, then the lower-cased key.
    pub fn ratio_for(&self, asset_key: &str) -> Option<f64> {
        self.ratios
            .get(asset_key)
            .or_else(|| self.ratios.get(&asset_key.to_lowercase()))
            .copied()
    }
}

/// Wire shape of the live feed: `{ daily: { asset: { currentRatio } } }`.
#[derive(Debug, Deserialize)]
pub struct LiveRatioPayload {
    #[serde(default)]
    pub daily: HashMap<String, LiveRatioEntry>,
}

#[derive(Debug, Deserialize)]
pub struct LiveRatioEntry {
    #[serde(rename = "currentRatio", default)]
    pub current_ratio: Option<f64>,
}

impl LiveRatioPayload {
    pub fn into_snapshot(self, fetched_at: DateTime<Utc>) -> LiveRatioSnapshot {
        let ratios = self.daily
            .into_iter()
            .filter_map(|(key, entry)| entry.current_ratio.map(|ratio| (key, ratio)))
            .collect();

        LiveRatioSnapshot { fetched_at, ratios }
    }
}
