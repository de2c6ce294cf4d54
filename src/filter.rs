use crate::error::{Error, Result};
use crate::types::timestamp::instant_ms;
use crate::types::{DailyRatio, PricePoint};

/// Anything that can be placed on the time axis.
pub trait TimePoint {
    fn timestamp_ms(&self) -> Option<i64>;
}

impl TimePoint for PricePoint {
    fn timestamp_ms(&self) -> Option<i64> {
        Some(self.timestamp)
    }
}

impl TimePoint for DailyRatio {
    fn timestamp_ms(&self) -> Option<i64> {
        instant_ms(&self.date)
    }
}

/// Inclusive `[from, to]` window in epoch milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: i64,
    pub to: i64,
}

impl TimeWindow {
    /// Parses caller-supplied bounds. Either bound missing (or empty) means
    /// no window. A 13-character bound is already in milliseconds; anything
    /// else is seconds.
    pub fn from_query(from: Option<&str>, to: Option<&str>) -> Result<Option<Self>> {
        let from = from.map(str::trim).filter(|s| !s.is_empty());
        let to = to.map(str::trim).filter(|s| !s.is_empty());

        match (from, to) {
            (Some(from), Some(to)) => Ok(Some(TimeWindow {
                from: bound_ms("from", from)?,
                to: bound_ms("to", to)?,
            })),
            _ => Ok(None),
        }
    }

    pub fn contains(&self, timestamp_ms: i64) -> bool {
        self.from <= timestamp_ms && timestamp_ms <= self.to
    }
}

fn bound_ms(name: &'static str, raw: &str) -> Result<i64> {
    let invalid = || Error::InvalidParameter {
        name,
        value: raw.to_string(),
    };

    let value: i64 = raw.parse().map_err(|_| invalid())?;
    if raw.len() == 13 {
        Ok(value)
    } else {
        value.checked_mul(1000).ok_or_else(invalid)
    }
}

/// Points inside `window`, or all of them when there is no window. Points
/// with no position on the time axis are dropped by a window.
pub fn filter_window<P: TimePoint + Clone>(points: &[P], window: Option<&TimeWindow>) -> Vec<P> {
    match window {
        None => points.to_vec(),
        Some(window) => points
            .iter()
            .filter(|p| p.timestamp_ms().is_some_and(|t| window.contains(t)))
            .cloned()
            .collect(),
    }
}
