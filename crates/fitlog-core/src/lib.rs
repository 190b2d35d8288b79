#![deny(clippy::all)]

mod aggregator;
pub mod calendar;
mod classify;
pub mod clock;
mod datekey;
mod error;
mod ordering;
pub mod snapshot;
pub mod summary;
mod window;

pub use aggregator::*;
pub use classify::*;
pub use datekey::{normalize, DateKey, DateLike};
pub use error::{Error, Result};
pub use ordering::*;
pub use snapshot::{ResolvedRecord, Snapshot};
pub use window::{Window, MAX_WINDOW_DAYS};

use serde::{Deserialize, Serialize};

pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// A kind of activity a user can log (push-ups, running, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCategory {
    pub id: String,
    #[serde(alias = "name")]
    pub display_name: String,
    #[serde(default)]
    pub unit: String,
}

/// One logged activity. `calendar_date` is the raw date-like value as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: String,
    #[serde(alias = "activity_type_id")]
    pub category_id: String,
    #[serde(alias = "value")]
    pub magnitude: f64,
    #[serde(alias = "date")]
    pub calendar_date: String,
    #[serde(default, alias = "notes", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A body-weight measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightEntry {
    pub id: String,
    pub weight: f64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMagnitude {
    pub category_id: String,
    pub magnitude: f64,
}

/// Aggregated activity for a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub date_key: DateKey,
    pub record_count: u32,
    pub total_magnitude: f64,
    /// Present only for [`CategoryFilter::All`], in the caller's category order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_category_magnitude: Option<Vec<CategoryMagnitude>>,
}

impl DayBucket {
    pub fn empty(date_key: DateKey) -> Self {
        Self {
            date_key,
            record_count: 0,
            total_magnitude: 0.0,
            per_category_magnitude: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.record_count > 0
    }

    pub fn magnitude_for(&self, category_id: &str) -> Option<f64> {
        self.per_category_magnitude
            .as_ref()?
            .iter()
            .find(|c| c.category_id == category_id)
            .map(|c| c.magnitude)
    }
}
