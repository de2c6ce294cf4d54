use crate::types::timestamp::DAY_MS;
use crate::types::{PricePoint, PriceSeries};

/// Largest gap (exclusive) between a target point and the base point it is divided by.
pub const MAX_MATCH_DISTANCE_MS: i64 = DAY_MS;

/// Divides `target` by `base`, pairing each target point with the base point
/// at the same timestamp or, failing that, the nearest one less than a day away.
///
/// Target points without a usable base are dropped. Output keeps `target`'s
/// order and metadata. When either side has no `prices` at all the result has
/// an empty price list.
pub fn compute_cross_rate(target: &PriceSeries, base: &PriceSeries) -> PriceSeries {
    let (Some(target_prices), Some(base_prices)) = (&target.prices, &base.prices) else {
        return target.with_prices(Vec::new());
    };

    let mut sorted_base = base_prices.clone();
    sorted_base.sort_by_key(|p| p.timestamp);

    let prices = target_prices
        .iter()
        .filter_map(|point| {
            nearest_base(&sorted_base, point.timestamp)
                .map(|b| PricePoint::new(point.timestamp, point.value / b.value))
        })
        .collect();

    target.with_prices(prices)
}

/// Same answer as scanning `sorted` front to back and keeping the first strict
/// minimum of `|t - timestamp|`: on a tie the earlier timestamp wins, and among
/// equal timestamps the first one in sorted order.
fn nearest_base(sorted: &[PricePoint], timestamp: i64) -> Option<&PricePoint> {
    let upper = sorted.partition_point(|p| p.timestamp < timestamp);

    if let Some(point) = sorted.get(upper) {
        if point.timestamp == timestamp {
            return Some(point);
        }
    }

    let below = upper.checked_sub(1).map(|idx| {
        let ts = sorted[idx].timestamp;
        &sorted[sorted.partition_point(|p| p.timestamp < ts)]
    });
    let above = sorted.get(upper);

    let best = match (below, above) {
        (Some(b), Some(a)) => {
            if a.timestamp.abs_diff(timestamp) < b.timestamp.abs_diff(timestamp) {
                a
            } else {
                b
            }
        }
        (Some(b), None) => b,
        (None, Some(a)) => a,
        (None, None) => return None,
    };

    (best.timestamp.abs_diff(timestamp) < MAX_MATCH_DISTANCE_MS as u64).then_some(best)
}
