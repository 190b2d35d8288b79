//! Streaks and heatmap intensity tiers

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregator::normalize_records;
use crate::datekey::DateKey;
use crate::{ActivityRecord, DayBucket};

pub const DEFAULT_STREAK_CAP: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntensityTier {
    None,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl IntensityTier {
    pub fn all() -> &'static [IntensityTier] {
        &[
            IntensityTier::None,
            IntensityTier::Low,
            IntensityTier::Medium,
            IntensityTier::High,
            IntensityTier::VeryHigh,
        ]
    }

    /// 0 for no activity up to 4 for the busiest tier.
    pub fn level(&self) -> u8 {
        match self {
            IntensityTier::None => 0,
            IntensityTier::Low => 1,
            IntensityTier::Medium => 2,
            IntensityTier::High => 3,
            IntensityTier::VeryHigh => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntensityTier::None => "none",
            IntensityTier::Low => "low",
            IntensityTier::Medium => "medium",
            IntensityTier::High => "high",
            IntensityTier::VeryHigh => "veryHigh",
        }
    }
}

/// Lower bounds (inclusive) of the upper three tiers. Anything above zero
/// and below `medium` is [`IntensityTier::Low`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntensityThresholds {
    pub medium: f64,
    pub high: f64,
    pub very_high: f64,
}

impl Default for IntensityThresholds {
    fn default() -> Self {
        Self {
            medium: 50.0,
            high: 100.0,
            very_high: 200.0,
        }
    }
}

impl IntensityThresholds {
    pub fn classify(&self, total_magnitude: f64) -> IntensityTier {
        if total_magnitude.is_nan() || total_magnitude <= 0.0 {
            IntensityTier::None
        } else if total_magnitude < self.medium {
            IntensityTier::Low
        } else if total_magnitude < self.high {
            IntensityTier::Medium
        } else if total_magnitude < self.very_high {
            IntensityTier::High
        } else {
            IntensityTier::VeryHigh
        }
    }

    /// Thresholds must be finite and non-decreasing.
    pub fn is_valid(&self) -> bool {
        [self.medium, self.high, self.very_high]
            .iter()
            .all(|t| t.is_finite() && *t >= 0.0)
            && self.medium <= self.high
            && self.high <= self.very_high
    }
}

/// Classify with the default thresholds.
pub fn classify(total_magnitude: f64) -> IntensityTier {
    IntensityThresholds::default().classify(total_magnitude)
}

/// How the "current streak" figure is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum StreakPolicy {
    /// Total number of records ever logged, capped. Ignores day contiguity.
    Capped { cap: u32 },
    /// Consecutive active days ending at the reference date.
    Contiguous,
}

impl Default for StreakPolicy {
    fn default() -> Self {
        StreakPolicy::Capped {
            cap: DEFAULT_STREAK_CAP,
        }
    }
}

pub fn capped_streak(total_records: usize, cap: u32) -> u32 {
    u32::try_from(total_records).unwrap_or(u32::MAX).min(cap)
}

/// Walk backward from `reference` over dense day buckets, counting days with
/// at least one record. Stops at the first inactive or missing day.
pub fn contiguous_streak(buckets: &[DayBucket], reference: NaiveDate) -> u32 {
    let counts: HashMap<DateKey, u32> = buckets
        .iter()
        .map(|b| (b.date_key, b.record_count))
        .collect();
    count_back(reference, |key| counts.get(&key).is_some_and(|c| *c > 0))
}

pub fn compute_streak(
    records: &[ActivityRecord],
    reference: NaiveDate,
    policy: StreakPolicy,
) -> u32 {
    match policy {
        StreakPolicy::Capped { cap } => capped_streak(records.len(), cap),
        StreakPolicy::Contiguous => {
            let days = active_days(records);
            count_back(reference, |key| days.contains(&key))
        }
    }
}

/// Longest run of consecutive active days anywhere in the history.
pub fn longest_streak(records: &[ActivityRecord]) -> u32 {
    let mut longest = 0u32;
    let mut streak = 0u32;
    let mut prev: Option<DateKey> = None;

    for day in active_days(records) {
        streak = match prev {
            Some(p) if p.succ() == Some(day) => streak + 1,
            _ => 1,
        };
        longest = longest.max(streak);
        prev = Some(day);
    }

    longest
}

fn active_days(records: &[ActivityRecord]) -> BTreeSet<DateKey> {
    normalize_records(records)
        .into_iter()
        .map(|(key, _)| key)
        .collect()
}

fn count_back(reference: NaiveDate, is_active: impl Fn(DateKey) -> bool) -> u32 {
    let mut streak = 0u32;
    let mut day = Some(DateKey::from_date(reference));
    while let Some(key) = day {
        if !is_active(key) {
            break;
        }
        streak += 1;
        day = key.pred();
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(id: usize, calendar_date: &str) -> ActivityRecord {
        ActivityRecord {
            id: format!("r{}", id),
            category_id: "pushup".to_string(),
            magnitude: 10.0,
            calendar_date: calendar_date.to_string(),
            note: None,
        }
    }

    fn bucket(day: &str, count: u32) -> DayBucket {
        let mut b = DayBucket::empty(day.parse().unwrap());
        b.record_count = count;
        b
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0.0), IntensityTier::None);
        assert_eq!(classify(0.001), IntensityTier::Low);
        assert_eq!(classify(49.999), IntensityTier::Low);
        assert_eq!(classify(50.0), IntensityTier::Medium);
        assert_eq!(classify(99.999), IntensityTier::Medium);
        assert_eq!(classify(100.0), IntensityTier::High);
        assert_eq!(classify(199.999), IntensityTier::High);
        assert_eq!(classify(200.0), IntensityTier::VeryHigh);
        assert_eq!(classify(1e9), IntensityTier::VeryHigh);
    }

    #[test]
    fn test_classify_degenerate_totals() {
        assert_eq!(classify(-1.0), IntensityTier::None);
        assert_eq!(classify(f64::NAN), IntensityTier::None);
        assert_eq!(classify(f64::INFINITY), IntensityTier::VeryHigh);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = IntensityThresholds {
            medium: 5.0,
            high: 10.0,
            very_high: 20.0,
        };
        assert_eq!(thresholds.classify(4.0), IntensityTier::Low);
        assert_eq!(thresholds.classify(5.0), IntensityTier::Medium);
        assert_eq!(thresholds.classify(19.0), IntensityTier::High);
        assert_eq!(thresholds.classify(20.0), IntensityTier::VeryHigh);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(IntensityThresholds::default().is_valid());
        assert!(!IntensityThresholds {
            medium: 100.0,
            high: 50.0,
            very_high: 200.0
        }
        .is_valid());
        assert!(!IntensityThresholds {
            medium: f64::NAN,
            ..Default::default()
        }
        .is_valid());
    }

    #[test]
    fn test_thresholds_deserialize_partial() {
        let t: IntensityThresholds = serde_json::from_str(r#"{"veryHigh": 500}"#).unwrap();
        assert_eq!(t.medium, 50.0);
        assert_eq!(t.high, 100.0);
        assert_eq!(t.very_high, 500.0);
    }

    #[test]
    fn test_tier_levels_are_ordered() {
        let levels: Vec<u8> = IntensityTier::all().iter().map(|t| t.level()).collect();
        assert_eq!(levels, vec![0, 1, 2, 3, 4]);
        assert_eq!(IntensityTier::VeryHigh.as_str(), "veryHigh");
        assert_eq!(
            serde_json::to_string(&IntensityTier::VeryHigh).unwrap(),
            "\"veryHigh\""
        );
    }

    #[test]
    fn test_capped_streak() {
        let three: Vec<ActivityRecord> = (0..3).map(|i| record(i, "2020-01-01")).collect();
        let fifty: Vec<ActivityRecord> = (0..50).map(|i| record(i, "2020-01-01")).collect();
        let reference = date("2024-06-10");

        assert_eq!(compute_streak(&[], reference, StreakPolicy::default()), 0);
        assert_eq!(compute_streak(&three, reference, StreakPolicy::default()), 3);
        assert_eq!(compute_streak(&fifty, reference, StreakPolicy::default()), 7);
    }

    #[test]
    fn test_capped_streak_counts_unparseable_records() {
        let records = vec![record(0, "garbage"), record(1, "2024-06-10")];
        assert_eq!(
            compute_streak(&records, date("2024-06-10"), StreakPolicy::default()),
            2
        );
        assert_eq!(capped_streak(usize::MAX, 7), 7);
    }

    #[test]
    fn test_contiguous_streak_from_records() {
        let records = vec![
            record(0, "2024-06-10"),
            record(1, "2024-06-10T08:00:00+02:00"),
            record(2, "2024-06-09"),
            record(3, "2024-06-08"),
            record(4, "2024-06-06"),
        ];
        assert_eq!(
            compute_streak(&records, date("2024-06-10"), StreakPolicy::Contiguous),
            3
        );
        assert_eq!(
            compute_streak(&records, date("2024-06-11"), StreakPolicy::Contiguous),
            0
        );
        assert_eq!(
            compute_streak(&records, date("2024-06-06"), StreakPolicy::Contiguous),
            1
        );
    }

    #[test]
    fn test_contiguous_streak_from_buckets() {
        let buckets = vec![
            bucket("2024-06-06", 2),
            bucket("2024-06-07", 0),
            bucket("2024-06-08", 1),
            bucket("2024-06-09", 4),
            bucket("2024-06-10", 1),
        ];
        assert_eq!(contiguous_streak(&buckets, date("2024-06-10")), 3);
        assert_eq!(contiguous_streak(&buckets, date("2024-06-07")), 0);
        assert_eq!(contiguous_streak(&buckets, date("2024-06-12")), 0);
        assert_eq!(contiguous_streak(&[], date("2024-06-10")), 0);
    }

    #[test]
    fn test_longest_streak() {
        let records = vec![
            record(0, "2024-01-01"),
            record(1, "2024-01-02"),
            record(2, "2024-01-02"),
            record(3, "2024-01-05"),
            record(4, "2024-01-06"),
            record(5, "2024-01-07"),
            record(6, "2024-01-08"),
            record(7, "2024-02-01"),
        ];
        assert_eq!(longest_streak(&records), 4);
        assert_eq!(longest_streak(&[]), 0);
        assert_eq!(longest_streak(&records[..1]), 1);
    }

    #[test]
    fn test_streak_policy_serde() {
        let capped: StreakPolicy = serde_json::from_str(r#"{"mode":"capped","cap":3}"#).unwrap();
        assert_eq!(capped, StreakPolicy::Capped { cap: 3 });
        let contiguous: StreakPolicy = serde_json::from_str(r#"{"mode":"contiguous"}"#).unwrap();
        assert_eq!(contiguous, StreakPolicy::Contiguous);
    }
}
