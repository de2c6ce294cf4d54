use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One `[timestamp_ms, value]` sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "(i64, f64)", into = "(i64, f64)")]
pub struct PricePoint {
    pub timestamp: i64,  // Milliseconds since epoch
    pub value: f64,
}

impl PricePoint {
    pub fn new(timestamp: i64, value: f64) -> Self {
        PricePoint { timestamp, value }
    }
}

impl From<(i64, f64)> for PricePoint {
    fn from((timestamp, value): (i64, f64)) -> Self {
        PricePoint { timestamp, value }
    }
}

impl From<PricePoint> for (i64, f64) {
    fn from(point: PricePoint) -> Self {
        (point.timestamp, point.value)
    }
}

/// Price history payload. Only `prices` is interpreted; market caps, volumes
/// and anything else the upstream sends ride along in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<Vec<PricePoint>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PriceSeries {
    pub fn from_points(points: Vec<PricePoint>) -> Self {
        PriceSeries {
            prices: Some(points),
            extra: Map::new(),
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        self.prices.as_deref().unwrap_or_default()
    }

    /// Same metadata, different prices.
    pub fn with_prices(&self, prices: Vec<PricePoint>) -> Self {
        PriceSeries {
            prices: Some(prices),
            extra: self.extra.clone(),
        }
    }
}
