// Series-level steps of ratio reconciliation. Dates compare as UTC calendar
// dates via `types::timestamp`.

use chrono::NaiveDate;

use crate::types::timestamp::{epoch_date, same_calendar_day};
use crate::types::DailyRatio;

/// Drops the trailing run of sentinel entries. Interior sentinels stay.
pub fn trim_trailing_sentinels(series: &mut Vec<DailyRatio>) {
    let keep = series
        .iter()
        .rposition(|entry| !entry.is_sentinel())
        .map_or(0, |idx| idx + 1);
    series.truncate(keep);
}

/// Latest readable calendar date in the series.
pub fn latest_calendar_date(series: &[DailyRatio]) -> Option<NaiveDate> {
    series.iter().filter_map(DailyRatio::calendar_date).max()
}

/// Latest readable calendar date, or the epoch when no entry has one.
pub fn last_calendar_date(series: &[DailyRatio]) -> NaiveDate {
    latest_calendar_date(series).unwrap_or_else(epoch_date)
}

pub fn contains_day(series: &[DailyRatio], date: &str) -> bool {
    series.iter().any(|entry| same_calendar_day(&entry.date, date))
}

/// Appends cached entries dated after the series' last day, skipping days the
/// series already has. Returns how many were appended.
pub fn merge_cached(series: &mut Vec<DailyRatio>, cached: &[DailyRatio]) -> usize {
    let last_api_date = last_calendar_date(series);

    let mut candidates: Vec<(NaiveDate, &DailyRatio)> = cached
        .iter()
        .filter_map(|entry| entry.calendar_date().map(|date| (date, entry)))
        .filter(|(date, _)| *date > last_api_date)
        .collect();
    candidates.sort_by_key(|(date, _)| *date);

    let mut appended = 0;
    for (_, entry) in candidates {
        if !contains_day(series, &entry.date) {
            series.push(entry.clone());
            appended += 1;
        }
    }
    appended
}

/// True when the series has no entry for `today` and appending one keeps it
/// in ascending order. A non-empty series without any readable date is never
/// patched.
pub fn missing_today(series: &[DailyRatio], today: NaiveDate) -> bool {
    match latest_calendar_date(series) {
        Some(date) => date < today,
        None => series.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(items: &[(&str, f64)]) -> Vec<DailyRatio> {
        items.iter().map(|(date, ratio)| DailyRatio::new(*date, *ratio)).collect()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_trim_keeps_leading_sentinel() {
        let mut series = entries(&[("2024-01-01", 1.0), ("2024-01-02", 1.05), ("2024-01-03", 1.0)]);
        trim_trailing_sentinels(&mut series);
        assert_eq!(series, entries(&[("2024-01-01", 1.0), ("2024-01-02", 1.05)]));
    }

    #[test]
    fn test_trim_keeps_interior_sentinels() {
        let mut series = entries(&[("2024-01-01", 1.1), ("2024-01-02", 1.0), ("2024-01-03", 1.2)]);
        trim_trailing_sentinels(&mut series);
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_trim_all_sentinels_empties_series() {
        let mut series = entries(&[("2024-01-01", 1.0), ("2024-01-02", 1.0)]);
        trim_trailing_sentinels(&mut series);
        assert!(series.is_empty());
    }

    #[test]
    fn test_trim_is_idempotent() {
        let mut series = entries(&[("2024-01-01", 0.9), ("2024-01-02", 1.0)]);
        trim_trailing_sentinels(&mut series);
        let once = series.clone();
        trim_trailing_sentinels(&mut series);
        assert_eq!(series, once);
    }

    #[test]
    fn test_last_date_of_empty_series_is_epoch() {
        assert_eq!(last_calendar_date(&[]), ymd(1970, 1, 1));
        assert_eq!(last_calendar_date(&entries(&[("2024-03-05T10:00:00Z", 1.1)])), ymd(2024, 3, 5));
    }

    #[test]
    fn test_last_date_skips_unreadable_tail() {
        let series = entries(&[("2024-01-05", 1.1), ("sometime", 1.2)]);
        assert_eq!(last_calendar_date(&series), ymd(2024, 1, 5));
        assert_eq!(latest_calendar_date(&entries(&[("sometime", 1.2)])), None);
    }

    #[test]
    fn test_merge_after_space_separated_date_keeps_order() {
        let mut series = entries(&[("2024-01-05", 1.1), ("2024-01-06 00:00:00", 1.2)]);
        let cached = entries(&[("2024-01-03", 1.3), ("2024-01-07", 1.4)]);

        assert_eq!(merge_cached(&mut series, &cached), 1);
        assert_eq!(
            series,
            entries(&[("2024-01-05", 1.1), ("2024-01-06 00:00:00", 1.2), ("2024-01-07", 1.4)])
        );
    }

    #[test]
    fn test_merge_appends_only_later_days() {
        let mut series = entries(&[("2024-01-01", 1.1), ("2024-01-02", 1.2)]);
        let cached = entries(&[("2024-01-01", 9.0), ("2024-01-03", 1.3), ("2024-01-04", 1.4)]);

        assert_eq!(merge_cached(&mut series, &cached), 2);
        assert_eq!(
            series,
            entries(&[("2024-01-01", 1.1), ("2024-01-02", 1.2), ("2024-01-03", 1.3), ("2024-01-04", 1.4)])
        );
    }

    #[test]
    fn test_merge_skips_same_day_with_different_time() {
        let mut series = entries(&[("2024-01-02", 1.2)]);
        let cached = entries(&[("2024-01-02T18:00:00.000Z", 1.25), ("2024-01-03T09:00:00.000Z", 1.3)]);

        assert_eq!(merge_cached(&mut series, &cached), 1);
        assert_eq!(series.last().unwrap().date, "2024-01-03T09:00:00.000Z");
    }

    #[test]
    fn test_merge_dedups_within_cache() {
        let mut series = entries(&[("2024-01-01", 1.1)]);
        let cached = entries(&[("2024-01-03T01:00:00Z", 1.3), ("2024-01-02", 1.2), ("2024-01-03T05:00:00Z", 1.35)]);

        assert_eq!(merge_cached(&mut series, &cached), 2);
        assert_eq!(
            series,
            entries(&[("2024-01-01", 1.1), ("2024-01-02", 1.2), ("2024-01-03T01:00:00Z", 1.3)])
        );
    }

    #[test]
    fn test_merge_into_empty_series_takes_everything() {
        let mut series = Vec::new();
        let cached = entries(&[("2024-01-01", 1.1), ("bogus", 1.2)]);
        assert_eq!(merge_cached(&mut series, &cached), 1);
    }

    #[test]
    fn test_missing_today() {
        let today = ymd(2024, 1, 3);
        assert!(missing_today(&[], today));
        assert!(missing_today(&entries(&[("2024-01-02", 1.1)]), today));
        assert!(!missing_today(&entries(&[("2024-01-03T00:00:01Z", 1.1)]), today));
        assert!(!missing_today(&entries(&[("2024-01-04", 1.1)]), today));
        assert!(missing_today(&entries(&[("2024-01-02", 1.1), ("n/a", 1.2)]), today));
        assert!(!missing_today(&entries(&[("n/a", 1.2)]), today));
    }
}
