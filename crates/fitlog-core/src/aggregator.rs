//! Windowed daily rollups of activity records
//!
//! Produces one bucket per calendar day of the window, zero-filled, oldest first.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::datekey::{normalize, DateKey};
use crate::{ActivityCategory, ActivityRecord, CategoryMagnitude, DayBucket, Window};

/// Which records a rollup sums over.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "categoryId", rename_all = "camelCase")]
pub enum CategoryFilter {
    /// Every known category, with a per-category breakdown.
    #[default]
    All,
    /// A single category id, totals only.
    Only(String),
}

impl CategoryFilter {
    pub fn from_option(category_id: Option<String>) -> Self {
        match category_id {
            Some(id) => CategoryFilter::Only(id),
            None => CategoryFilter::All,
        }
    }
}

/// Pair each record with its day key, dropping records whose date cannot be read.
pub fn normalize_records(records: &[ActivityRecord]) -> Vec<(DateKey, &ActivityRecord)> {
    records
        .iter()
        .filter_map(|record| match normalize(record.calendar_date.as_str()) {
            Ok(key) => Some((key, record)),
            Err(err) => {
                tracing::debug!(record_id = %record.id, error = %err, "skipping record");
                None
            }
        })
        .collect()
}

/// Roll records up into one bucket per day of `window`.
///
/// `categories` fixes the order of the per-category breakdown. With
/// [`CategoryFilter::All`], records referencing a category missing from
/// `categories` are skipped so that each day's total equals the sum of its
/// breakdown.
pub fn aggregate(
    records: &[ActivityRecord],
    categories: &[ActivityCategory],
    window: Window,
    reference: NaiveDate,
    filter: &CategoryFilter,
) -> Vec<DayBucket> {
    let keys = window.day_keys(reference);
    if keys.is_empty() {
        return Vec::new();
    }

    let slots = match filter {
        CategoryFilter::All => Some(CategorySlots::new(categories)),
        CategoryFilter::Only(_) => None,
    };
    let width = slots.as_ref().map_or(0, |s| s.ids.len());

    let positions: HashMap<DateKey, usize> =
        keys.iter().enumerate().map(|(i, key)| (*key, i)).collect();
    let mut days: Vec<DayAccumulator> = keys.iter().map(|_| DayAccumulator::new(width)).collect();

    for (key, record) in normalize_records(records) {
        let Some(&position) = positions.get(&key) else {
            continue;
        };

        let slot = match (filter, &slots) {
            (CategoryFilter::Only(id), _) => {
                if record.category_id != *id {
                    continue;
                }
                None
            }
            (CategoryFilter::All, Some(slots)) => match slots.position(&record.category_id) {
                Some(slot) => Some(slot),
                None => {
                    tracing::warn!(
                        record_id = %record.id,
                        category_id = %record.category_id,
                        "skipping record with unknown category"
                    );
                    continue;
                }
            },
            (CategoryFilter::All, None) => continue,
        };

        days[position].add_record(record.magnitude, slot);
    }

    let slot_ids = slots.as_ref().map(|s| s.ids.as_slice());
    keys.into_iter()
        .zip(days)
        .map(|(key, acc)| acc.into_bucket(key, slot_ids))
        .collect()
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Negative and non-finite magnitudes contribute nothing.
pub(crate) fn usable_magnitude(magnitude: f64) -> f64 {
    if magnitude.is_finite() && magnitude > 0.0 {
        magnitude
    } else {
        0.0
    }
}

struct CategorySlots<'a> {
    ids: Vec<&'a str>,
    index: HashMap<&'a str, usize>,
}

impl<'a> CategorySlots<'a> {
    fn new(categories: &'a [ActivityCategory]) -> Self {
        let mut ids = Vec::with_capacity(categories.len());
        let mut index = HashMap::with_capacity(categories.len());
        for category in categories {
            let id = category.id.as_str();
            if !index.contains_key(id) {
                index.insert(id, ids.len());
                ids.push(id);
            }
        }
        Self { ids, index }
    }

    fn position(&self, category_id: &str) -> Option<usize> {
        self.index.get(category_id).copied()
    }
}

struct DayAccumulator {
    records: u32,
    total: f64,
    per_category: Vec<f64>,
}

impl DayAccumulator {
    fn new(width: usize) -> Self {
        Self {
            records: 0,
            total: 0.0,
            per_category: vec![0.0; width],
        }
    }

    fn add_record(&mut self, magnitude: f64, slot: Option<usize>) {
        let magnitude = usable_magnitude(magnitude);

        self.records = self.records.saturating_add(1);
        match slot {
            Some(slot) => self.per_category[slot] += magnitude,
            None => self.total += magnitude,
        }
    }

    fn into_bucket(self, date_key: DateKey, slot_ids: Option<&[&str]>) -> DayBucket {
        match slot_ids {
            Some(ids) => {
                let breakdown: Vec<CategoryMagnitude> = ids
                    .iter()
                    .zip(self.per_category)
                    .map(|(id, magnitude)| CategoryMagnitude {
                        category_id: id.to_string(),
                        magnitude,
                    })
                    .collect();
                // Summed from the breakdown so the two can never disagree.
                let total = breakdown.iter().fold(0.0, |acc, c| acc + c.magnitude);
                DayBucket {
                    date_key,
                    record_count: self.records,
                    total_magnitude: total,
                    per_category_magnitude: Some(breakdown),
                }
            }
            None => DayBucket {
                date_key,
                record_count: self.records,
                total_magnitude: self.total,
                per_category_magnitude: None,
            },
        }
    }
}
