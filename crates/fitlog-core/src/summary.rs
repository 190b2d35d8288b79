//! Dashboard figures, body-weight trend and record listings

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregator::usable_magnitude;
use crate::datekey::{normalize, DateKey};
use crate::{
    compute_streak, longest_streak, normalize_records, ActivityCategory, ActivityRecord,
    DayBucket, ResolvedRecord, StreakPolicy, WeightEntry, Window,
};

const DASHBOARD_WINDOW_DAYS: i64 = 7;

/// Weight changes within this many units either way count as stable.
pub const WEIGHT_STABLE_BAND: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub today_count: u32,
    pub total: usize,
    pub last_7_days: Vec<DayBucket>,
    pub score: u32,
    pub streak: u32,
    pub longest_streak: u32,
}

/// Headline figures for the dashboard.
///
/// Every log with a readable date is counted, including logs whose category
/// has since been deleted, so the counts agree with `total` and the streak.
/// The 7-day buckets carry no per-category breakdown.
pub fn dashboard_stats(
    records: &[ActivityRecord],
    reference: NaiveDate,
    policy: StreakPolicy,
) -> DashboardStats {
    let mut last_7_days: Vec<DayBucket> = Window::trailing(DASHBOARD_WINDOW_DAYS)
        .day_keys(reference)
        .into_iter()
        .map(DayBucket::empty)
        .collect();
    let positions: HashMap<DateKey, usize> = last_7_days
        .iter()
        .enumerate()
        .map(|(i, bucket)| (bucket.date_key, i))
        .collect();

    for (key, record) in normalize_records(records) {
        if let Some(&i) = positions.get(&key) {
            let bucket = &mut last_7_days[i];
            bucket.record_count = bucket.record_count.saturating_add(1);
            bucket.total_magnitude += usable_magnitude(record.magnitude);
        }
    }

    let today_count = last_7_days.last().map_or(0, |b| b.record_count);
    let score = last_7_days.iter().map(|b| b.record_count).sum();

    DashboardStats {
        today_count,
        total: records.len(),
        last_7_days,
        score,
        streak: compute_streak(records, reference, policy),
        longest_streak: longest_streak(records),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Trend {
    Down,
    Stable,
    Up,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightTrend {
    pub current: f64,
    pub start: f64,
    pub change: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightPoint {
    pub date_key: DateKey,
    pub weight: f64,
}

/// Weight entries with readable dates, oldest first. Same-day entries keep input order.
pub fn weight_series(entries: &[WeightEntry]) -> Vec<WeightPoint> {
    let mut points: Vec<WeightPoint> = entries
        .iter()
        .filter_map(|entry| match normalize(entry.date.as_str()) {
            Ok(date_key) => Some(WeightPoint {
                date_key,
                weight: entry.weight,
            }),
            Err(err) => {
                tracing::debug!(entry_id = %entry.id, error = %err, "skipping weight entry");
                None
            }
        })
        .collect();
    points.sort_by_key(|p| p.date_key);
    points
}

pub fn weight_trend(entries: &[WeightEntry]) -> WeightTrend {
    let series = weight_series(entries);
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return WeightTrend {
            current: 0.0,
            start: 0.0,
            change: 0.0,
            trend: Trend::Stable,
        };
    };

    let change = last.weight - first.weight;
    let trend = if change < -WEIGHT_STABLE_BAND {
        Trend::Down
    } else if change > WEIGHT_STABLE_BAND {
        Trend::Up
    } else {
        Trend::Stable
    };

    WeightTrend {
        current: last.weight,
        start: first.weight,
        change,
        trend,
    }
}

/// A resolved record with its day key, for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEntry<'a> {
    pub date_key: DateKey,
    pub record: &'a ActivityRecord,
    pub category: &'a ActivityCategory,
}

/// The `limit` most recent records, newest first.
pub fn recent_records<'a>(resolved: &[ResolvedRecord<'a>], limit: usize) -> Vec<RecordEntry<'a>> {
    let mut entries = listable(resolved);
    entries.truncate(limit);
    entries
}

/// Records whose category name or note contains `needle`, case-insensitively,
/// newest first. An empty needle matches everything.
pub fn search_records<'a>(resolved: &[ResolvedRecord<'a>], needle: &str) -> Vec<RecordEntry<'a>> {
    let needle = needle.trim().to_lowercase();
    let mut entries = listable(resolved);
    if !needle.is_empty() {
        entries.retain(|e| {
            e.category.display_name.to_lowercase().contains(&needle)
                || e
                    .record
                    .note
                    .as_ref()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
        });
    }
    entries
}

fn listable<'a>(resolved: &[ResolvedRecord<'a>]) -> Vec<RecordEntry<'a>> {
    let mut entries: Vec<RecordEntry<'a>> = resolved
        .iter()
        .filter_map(|r| match r.require() {
            Ok((record, category)) => match normalize(record.calendar_date.as_str()) {
                Ok(date_key) => Some(RecordEntry {
                    date_key,
                    record,
                    category,
                }),
                Err(err) => {
                    tracing::debug!(record_id = %record.id, error = %err, "skipping record");
                    None
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "skipping record");
                None
            }
        })
        .collect();
    entries.sort_by_key(|e| Reverse(e.date_key));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Snapshot;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn category(id: &str, name: &str) -> ActivityCategory {
        ActivityCategory {
            id: id.to_string(),
            display_name: name.to_string(),
            unit: "reps".to_string(),
        }
    }

    fn record(id: &str, category_id: &str, calendar_date: &str, note: Option<&str>) -> ActivityRecord {
        ActivityRecord {
            id: id.to_string(),
            category_id: category_id.to_string(),
            magnitude: 10.0,
            calendar_date: calendar_date.to_string(),
            note: note.map(str::to_string),
        }
    }

    fn weight(id: &str, kg: f64, day: &str) -> WeightEntry {
        WeightEntry {
            id: id.to_string(),
            weight: kg,
            date: day.to_string(),
        }
    }

    fn mock_snapshot() -> Snapshot {
        Snapshot {
            categories: vec![category("p", "Push-up"), category("s", "Sit-up")],
            records: vec![
                record("1", "p", "2024-06-10", Some("Felt strong")),
                record("2", "s", "2024-06-10", None),
                record("3", "p", "2024-06-08", None),
                record("4", "s", "2024-06-01", Some("slow morning")),
                record("5", "x", "2024-06-09", None),
                record("6", "p", "someday", None),
            ],
            weights: Vec::new(),
        }
    }

    #[test]
    fn test_dashboard_stats() {
        let snapshot = mock_snapshot();
        let stats = dashboard_stats(&snapshot.records, date("2024-06-10"), StreakPolicy::default());

        assert_eq!(stats.today_count, 2);
        assert_eq!(stats.total, 6);
        assert_eq!(stats.last_7_days.len(), 7);
        assert_eq!(stats.last_7_days[0].date_key.to_string(), "2024-06-04");
        // "4" is outside the window; "5" counts although its category is gone.
        assert_eq!(stats.score, 4);
        assert_eq!(stats.last_7_days[5].record_count, 1);
        assert!(stats.last_7_days[6].per_category_magnitude.is_none());
        assert_eq!(stats.last_7_days[6].total_magnitude, 20.0);
        assert_eq!(stats.streak, 6);
        assert_eq!(stats.longest_streak, 3);
    }

    #[test]
    fn test_dashboard_stats_empty() {
        let stats = dashboard_stats(&[], date("2024-06-10"), StreakPolicy::default());
        assert_eq!(stats.today_count, 0);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.score, 0);
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.last_7_days.len(), 7);
    }

    #[test]
    fn test_dashboard_counts_logs_of_deleted_categories() {
        let records = vec![
            record("1", "p", "2024-06-10", None),
            record("2", "gone", "2024-06-10", None),
        ];
        let stats = dashboard_stats(&records, date("2024-06-10"), StreakPolicy::default());

        assert_eq!(stats.today_count, 2);
        assert_eq!(stats.score, 2);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.streak, 2);
    }

    #[test]
    fn test_dashboard_contiguous_streak() {
        let snapshot = mock_snapshot();
        let stats = dashboard_stats(&snapshot.records, date("2024-06-10"), StreakPolicy::Contiguous);
        // 06-10, 06-09 (orphan record still counts as activity), 06-08.
        assert_eq!(stats.streak, 3);
    }

    #[test]
    fn test_weight_trend_directions() {
        let down = weight_trend(&[
            weight("a", 80.0, "2024-06-10"),
            weight("b", 82.0, "2024-06-01"),
        ]);
        assert_eq!(down.start, 82.0);
        assert_eq!(down.current, 80.0);
        assert_eq!(down.change, -2.0);
        assert_eq!(down.trend, Trend::Down);

        let up = weight_trend(&[weight("a", 70.0, "2024-01-01"), weight("b", 70.6, "2024-02-01")]);
        assert_eq!(up.trend, Trend::Up);

        let stable = weight_trend(&[weight("a", 70.0, "2024-01-01"), weight("b", 70.5, "2024-02-01")]);
        assert_eq!(stable.trend, Trend::Stable);
    }

    #[test]
    fn test_weight_trend_empty_and_single() {
        let empty = weight_trend(&[]);
        assert_eq!(empty.current, 0.0);
        assert_eq!(empty.start, 0.0);
        assert_eq!(empty.change, 0.0);
        assert_eq!(empty.trend, Trend::Stable);

        let single = weight_trend(&[weight("a", 75.0, "2024-06-01")]);
        assert_eq!(single.current, 75.0);
        assert_eq!(single.start, 75.0);
        assert_eq!(single.trend, Trend::Stable);
    }

    #[test]
    fn test_weight_series_sorted_and_skips_bad_dates() {
        let series = weight_series(&[
            weight("a", 80.0, "2024-06-10"),
            weight("b", 81.0, "not a date"),
            weight("c", 82.0, "2024-06-01T07:30:00-04:00"),
        ]);
        let keys: Vec<String> = series.iter().map(|p| p.date_key.to_string()).collect();
        assert_eq!(keys, vec!["2024-06-01", "2024-06-10"]);
        assert_eq!(series[0].weight, 82.0);
    }

    #[test]
    fn test_recent_records() {
        let snapshot = mock_snapshot();
        let resolved = snapshot.resolve();

        let recent = recent_records(&resolved, 3);
        let ids: Vec<&str> = recent.iter().map(|e| e.record.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        assert_eq!(recent_records(&resolved, 100).len(), 4);
        assert!(recent_records(&resolved, 0).is_empty());
    }

    #[test]
    fn test_search_records() {
        let snapshot = mock_snapshot();
        let resolved = snapshot.resolve();

        let by_name: Vec<&str> = search_records(&resolved, "PUSH")
            .iter()
            .map(|e| e.record.id.as_str())
            .collect();
        assert_eq!(by_name, vec!["1", "3"]);

        let by_note: Vec<&str> = search_records(&resolved, "morning")
            .iter()
            .map(|e| e.record.id.as_str())
            .collect();
        assert_eq!(by_note, vec!["4"]);

        assert_eq!(search_records(&resolved, "  ").len(), 4);
        assert!(search_records(&resolved, "swim").is_empty());
    }
}
