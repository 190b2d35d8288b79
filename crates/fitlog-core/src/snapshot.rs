//! Point-in-time data handed over by the storage layer
//!
//! Accepts both the camelCase field names used throughout this crate and the
//! table/column names of a raw database export (`activity_types`,
//! `activity_logs`, `weight_logs`, `activity_type_id`, `value`, ...).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::{ActivityCategory, ActivityRecord, WeightEntry};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, alias = "activity_types")]
    pub categories: Vec<ActivityCategory>,
    #[serde(default, alias = "activity_logs")]
    pub records: Vec<ActivityRecord>,
    #[serde(default, alias = "weight_logs")]
    pub weights: Vec<WeightEntry>,
}

/// A record joined with its category, or flagged as dangling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedRecord<'a> {
    Resolved {
        record: &'a ActivityRecord,
        category: &'a ActivityCategory,
    },
    MissingCategory {
        record: &'a ActivityRecord,
    },
}

impl<'a> ResolvedRecord<'a> {
    pub fn record(&self) -> &'a ActivityRecord {
        match *self {
            ResolvedRecord::Resolved { record, .. } => record,
            ResolvedRecord::MissingCategory { record } => record,
        }
    }

    pub fn category(&self) -> Option<&'a ActivityCategory> {
        match *self {
            ResolvedRecord::Resolved { category, .. } => Some(category),
            ResolvedRecord::MissingCategory { .. } => None,
        }
    }

    /// Treat a dangling category reference as an error.
    pub fn require(self) -> Result<(&'a ActivityRecord, &'a ActivityCategory)> {
        match self {
            ResolvedRecord::Resolved { record, category } => Ok((record, category)),
            ResolvedRecord::MissingCategory { record } => Err(Error::MissingCategory {
                record_id: record.id.clone(),
                category_id: record.category_id.clone(),
            }),
        }
    }
}

impl Snapshot {
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.records.is_empty() && self.weights.is_empty()
    }

    pub fn category(&self, id: &str) -> Option<&ActivityCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Join every record with its category, preserving record order.
    pub fn resolve(&self) -> Vec<ResolvedRecord<'_>> {
        let mut by_id: HashMap<&str, &ActivityCategory> =
            HashMap::with_capacity(self.categories.len());
        for category in &self.categories {
            by_id.entry(category.id.as_str()).or_insert(category);
        }

        self.records
            .iter()
            .map(|record| match by_id.get(record.category_id.as_str()).copied() {
                Some(category) => ResolvedRecord::Resolved { record, category },
                None => ResolvedRecord::MissingCategory { record },
            })
            .collect()
    }
}
