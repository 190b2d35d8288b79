//! Monthly calendar heatmap
//!
//! Lays the calendar-month rollup out as Sunday-first weeks. Cells before the
//! 1st and after the last day of the month are `None`.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::{
    aggregate, ActivityCategory, ActivityRecord, CategoryFilter, DayBucket, IntensityThresholds,
    IntensityTier, Window,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    #[serde(flatten)]
    pub bucket: DayBucket,
    pub tier: IntensityTier,
    pub is_reference: bool,
    pub is_future: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Vec<Option<CalendarDay>>>,
    pub active_days: u32,
    pub total_magnitude: f64,
}

impl MonthCalendar {
    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.weeks.iter().flatten().flatten()
    }
}

pub fn month_calendar(
    records: &[ActivityRecord],
    categories: &[ActivityCategory],
    reference: NaiveDate,
    filter: &CategoryFilter,
    thresholds: &IntensityThresholds,
) -> MonthCalendar {
    let buckets = aggregate(records, categories, Window::CalendarMonth, reference, filter);
    build_month_calendar(reference, buckets, thresholds)
}

/// Arrange an already-computed calendar-month rollup into weeks.
pub fn build_month_calendar(
    reference: NaiveDate,
    buckets: Vec<DayBucket>,
    thresholds: &IntensityThresholds,
) -> MonthCalendar {
    let active_days = buckets.iter().filter(|b| b.is_active()).count() as u32;
    let total_magnitude = buckets.iter().fold(0.0, |acc, b| acc + b.total_magnitude);

    let mut weeks: Vec<Vec<Option<CalendarDay>>> = Vec::new();
    let mut current_week: Vec<Option<CalendarDay>> = Vec::with_capacity(7);

    if let Some(first) = buckets.first() {
        let leading = first.date_key.date().weekday().num_days_from_sunday();
        current_week.extend((0..leading).map(|_| None));
    }

    for bucket in buckets {
        let date = bucket.date_key.date();
        let tier = thresholds.classify(bucket.total_magnitude);
        current_week.push(Some(CalendarDay {
            bucket,
            tier,
            is_reference: date == reference,
            is_future: date > reference,
        }));

        if date.weekday() == Weekday::Sat {
            weeks.push(std::mem::take(&mut current_week));
        }
    }

    if !current_week.is_empty() {
        current_week.resize(7, None);
        weeks.push(current_week);
    }

    MonthCalendar {
        year: reference.year(),
        month: reference.month(),
        weeks,
        active_days,
        total_magnitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(id: &str, magnitude: f64, calendar_date: &str) -> ActivityRecord {
        ActivityRecord {
            id: id.to_string(),
            category_id: "pushup".to_string(),
            magnitude,
            calendar_date: calendar_date.to_string(),
            note: None,
        }
    }

    fn categories() -> Vec<ActivityCategory> {
        vec![ActivityCategory {
            id: "pushup".to_string(),
            display_name: "Push-up".to_string(),
            unit: "reps".to_string(),
        }]
    }

    #[test]
    fn test_june_2024_layout() {
        // 2024-06-01 is a Saturday, 2024-06-30 a Sunday.
        let cal = month_calendar(
            &[],
            &categories(),
            date("2024-06-10"),
            &CategoryFilter::All,
            &IntensityThresholds::default(),
        );

        assert_eq!((cal.year, cal.month), (2024, 6));
        assert_eq!(cal.weeks.len(), 6);
        assert!(cal.weeks.iter().all(|w| w.len() == 7));

        let first_week = &cal.weeks[0];
        assert!(first_week[..6].iter().all(Option::is_none));
        assert_eq!(
            first_week[6].as_ref().unwrap().bucket.date_key.to_string(),
            "2024-06-01"
        );

        let last_week = &cal.weeks[5];
        assert_eq!(
            last_week[0].as_ref().unwrap().bucket.date_key.to_string(),
            "2024-06-30"
        );
        assert!(last_week[1..].iter().all(Option::is_none));

        assert_eq!(cal.days().count(), 30);
        assert_eq!(cal.active_days, 0);
    }

    #[test]
    fn test_month_starting_on_sunday() {
        // 2024-09-01 is a Sunday.
        let cal = month_calendar(
            &[],
            &categories(),
            date("2024-09-15"),
            &CategoryFilter::All,
            &IntensityThresholds::default(),
        );
        assert!(cal.weeks[0][0].is_some());
        assert_eq!(cal.weeks.len(), 5);
    }

    #[test]
    fn test_tiers_and_flags() {
        let records = vec![
            record("a", 30.0, "2024-06-03"),
            record("b", 30.0, "2024-06-03"),
            record("c", 150.0, "2024-06-05"),
            record("d", 250.0, "2024-06-10"),
        ];
        let cal = month_calendar(
            &records,
            &categories(),
            date("2024-06-10"),
            &CategoryFilter::All,
            &IntensityThresholds::default(),
        );

        let day = |key: &str| {
            cal.days()
                .find(|d| d.bucket.date_key.to_string() == key)
                .unwrap()
                .clone()
        };

        assert_eq!(day("2024-06-03").tier, IntensityTier::Medium);
        assert_eq!(day("2024-06-05").tier, IntensityTier::High);
        assert_eq!(day("2024-06-10").tier, IntensityTier::VeryHigh);
        assert_eq!(day("2024-06-04").tier, IntensityTier::None);

        assert!(day("2024-06-10").is_reference);
        assert!(!day("2024-06-10").is_future);
        assert!(day("2024-06-11").is_future);

        assert_eq!(cal.active_days, 3);
        assert_eq!(cal.total_magnitude, 460.0);
    }

    #[test]
    fn test_serializes_flat_day_cells() {
        let cal = month_calendar(
            &[record("a", 10.0, "2024-06-01")],
            &categories(),
            date("2024-06-01"),
            &CategoryFilter::Only("pushup".to_string()),
            &IntensityThresholds::default(),
        );
        let json = serde_json::to_value(&cal).unwrap();
        let cell = &json["weeks"][0][6];
        assert_eq!(cell["dateKey"], "2024-06-01");
        assert_eq!(cell["recordCount"], 1);
        assert_eq!(cell["tier"], "low");
        assert!(json["weeks"][0][0].is_null());
    }
}
