use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use proptest::prelude::*;
use serde_json::json;

use ratio_proxy::error::Result;
use ratio_proxy::filter::{filter_window, TimeWindow};
use ratio_proxy::interfaces::{BlobStore, LiveRatioSource};
use ratio_proxy::pricing::compute_cross_rate;
use ratio_proxy::ratios::merge::{merge_cached, trim_trailing_sentinels};
use ratio_proxy::ratios::{LiveRatioCache, RatioReconciler};
use ratio_proxy::store::MemoryBlobStore;
use ratio_proxy::types::timestamp::{iso_instant, DAY_MS};
use ratio_proxy::types::{DailyRatio, LiveRatioSnapshot, PricePoint, PriceSeries};
use ratio_proxy::DURABLE_CACHE_KEY;

fn date(offset: u32) -> String {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (start + Duration::days(offset as i64)).format("%Y-%m-%d").to_string()
}

fn ratio() -> impl Strategy<Value = f64> {
    prop_oneof![Just(1.0), 0.01f64..10.0]
}

fn real_ratio() -> impl Strategy<Value = f64> {
    (0.01f64..10.0).prop_filter("observed ratio", |r| *r != 1.0)
}

fn ascending_series(max_len: usize) -> impl Strategy<Value = Vec<DailyRatio>> {
    series_of(max_len, ratio().boxed())
}

fn series_of(max_len: usize, ratios: BoxedStrategy<f64>) -> impl Strategy<Value = Vec<DailyRatio>> {
    prop::collection::btree_set(0u32..120, 0..max_len).prop_flat_map(move |days| {
        let days: Vec<u32> = days.into_iter().collect();
        prop::collection::vec(ratios.clone(), days.len()).prop_map(move |ratios| {
            days.iter()
                .zip(ratios)
                .map(|(d, r)| DailyRatio::new(date(*d), r))
                .collect()
        })
    })
}

fn price_points(max_len: usize) -> impl Strategy<Value = Vec<PricePoint>> {
    prop::collection::vec((0i64..2_000_000_000_000, 0.001f64..1_000.0), 0..max_len)
        .prop_map(|points| points.into_iter().map(PricePoint::from).collect())
}

fn noon(offset: u32) -> DateTime<Utc> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (start + Duration::days(offset as i64))
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc()
}

struct StaticLiveSource {
    ratio: Option<f64>,
}

#[async_trait]
impl LiveRatioSource for StaticLiveSource {
    async fn fetch_live(&self) -> Result<LiveRatioSnapshot> {
        let ratios: HashMap<String, f64> = self.ratio
            .map(|ratio| ("snek".to_string(), ratio))
            .into_iter()
            .collect();
        Ok(LiveRatioSnapshot { fetched_at: Utc::now(), ratios })
    }
}

fn reconcile_once(
    upstream: &[DailyRatio],
    cached: &[DailyRatio],
    live_ratio: Option<f64>,
    now: DateTime<Utc>,
) -> (Vec<DailyRatio>, usize, serde_json::Value) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async {
        let store = Arc::new(MemoryBlobStore::new());
        store.save(DURABLE_CACHE_KEY, &json!({ "SNEK": cached })).await.unwrap();

        let live = LiveRatioCache::new(
            Arc::new(StaticLiveSource { ratio: live_ratio }),
            std::time::Duration::from_secs(300),
        );
        let reconciler = RatioReconciler::new(store.clone(), DURABLE_CACHE_KEY, Some(Arc::new(live)));

        let payload = json!({ "success": true, "data": { "assets": { "SNEK": { "dailyRatios": upstream } } } });
        let snapshot = reconciler.reconcile(payload, now).await;
        let series = snapshot.series("SNEK").unwrap().to_vec();
        let stored = store.get(DURABLE_CACHE_KEY).unwrap();
        (series, snapshot.live_patches, stored)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn reconciled_series_is_ordered_and_ledger_only_grows(
        upstream in ascending_series(20),
        cached in series_of(20, real_ratio().boxed()),
        live_ratio in prop::option::of(ratio()),
        day in 0u32..130,
    ) {
        let now = noon(day);
        let (series, live_patches, stored) = reconcile_once(&upstream, &cached, live_ratio, now);

        let dates: Vec<NaiveDate> = series.iter().filter_map(DailyRatio::calendar_date).collect();
        prop_assert_eq!(dates.len(), series.len());
        prop_assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
        if let Some(last) = series.last() {
            prop_assert!(!last.is_sentinel());
        }

        let mut trimmed = upstream.clone();
        trim_trailing_sentinels(&mut trimmed);
        let latest = trimmed.iter().chain(&cached).filter_map(DailyRatio::calendar_date).max();
        let expects_patch = live_ratio.is_some_and(|r| r != 1.0)
            && latest.is_none_or(|date| date < now.date_naive());
        prop_assert_eq!(live_patches, usize::from(expects_patch));

        let ledger = stored["SNEK"].as_array().unwrap();
        for entry in &cached {
            prop_assert!(ledger.contains(&serde_json::to_value(entry).unwrap()));
        }
        if expects_patch {
            let patched = series.last().unwrap();
            prop_assert_eq!(&patched.date, &iso_instant(now));
            prop_assert_eq!(Some(patched.ratio), live_ratio);
            prop_assert_eq!(ledger.len(), cached.len() + 1);
        } else {
            prop_assert_eq!(ledger.len(), cached.len());
        }
    }
}

proptest! {
    #[test]
    fn trim_is_idempotent_and_ends_on_real_value(mut series in ascending_series(30)) {
        trim_trailing_sentinels(&mut series);
        let once = series.clone();
        trim_trailing_sentinels(&mut series);

        prop_assert_eq!(&series, &once);
        if let Some(last) = series.last() {
            prop_assert!(!last.is_sentinel());
        }
    }

    #[test]
    fn merge_keeps_dates_unique_and_ascending(
        mut series in ascending_series(30),
        cached in ascending_series(30),
    ) {
        trim_trailing_sentinels(&mut series);
        merge_cached(&mut series, &cached);

        let dates: Vec<NaiveDate> = series.iter().filter_map(DailyRatio::calendar_date).collect();
        prop_assert_eq!(dates.len(), series.len());
        prop_assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn cross_rate_points_come_from_target_within_a_day(
        target in price_points(40),
        base in price_points(40),
    ) {
        let result = compute_cross_rate(
            &PriceSeries::from_points(target.clone()),
            &PriceSeries::from_points(base.clone()),
        );

        prop_assert!(result.points().len() <= target.len());
        for point in result.points() {
            prop_assert!(target.iter().any(|t| t.timestamp == point.timestamp));
            prop_assert!(base.iter().any(|b| (b.timestamp - point.timestamp).abs() < DAY_MS));
        }
    }

    #[test]
    fn seconds_and_millis_windows_agree(
        from_secs in 1_000_000_000i64..9_999_999_999,
        span_secs in 0i64..100_000_000,
        points in price_points(40),
    ) {
        let to_secs = (from_secs + span_secs).min(9_999_999_999);
        let seconds = TimeWindow::from_query(
            Some(&from_secs.to_string()),
            Some(&to_secs.to_string()),
        ).unwrap();
        let millis = TimeWindow::from_query(
            Some(&(from_secs * 1000).to_string()),
            Some(&(to_secs * 1000).to_string()),
        ).unwrap();

        prop_assert_eq!(seconds, millis);
        prop_assert_eq!(filter_window(&points, seconds.as_ref()), filter_window(&points, millis.as_ref()));
    }
}
