use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::datekey::DateKey;
use crate::error::{Error, Result};

/// Longest trailing window, in days. Longer requests are cut to this length.
pub const MAX_WINDOW_DAYS: i64 = 3_660;

/// The span of calendar days an aggregation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Window {
    /// The `days` most recent days, ending at and including the reference date.
    Trailing { days: i64 },
    /// Every day of the month containing the reference date.
    CalendarMonth,
}

impl Window {
    pub fn trailing(days: i64) -> Self {
        Window::Trailing { days }
    }

    /// Like [`Window::trailing`], but rejects empty and over-long windows.
    pub fn trailing_checked(days: i64) -> Result<Self> {
        if days <= 0 || days > MAX_WINDOW_DAYS {
            return Err(Error::InvalidWindow { days });
        }
        Ok(Window::Trailing { days })
    }

    /// First and last day covered, or `None` for an empty window.
    pub fn bounds(&self, reference: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            Window::Trailing { days } if days <= 0 => None,
            Window::Trailing { days } => {
                let start = Duration::try_days(days.min(MAX_WINDOW_DAYS) - 1)
                    .and_then(|span| reference.checked_sub_signed(span))
                    .unwrap_or(NaiveDate::MIN);
                Some((start, reference))
            }
            Window::CalendarMonth => {
                let first = reference.with_day(1).unwrap_or(reference);
                let last = first
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .unwrap_or(reference);
                Some((first, last))
            }
        }
    }

    /// Dense, ascending day keys for the window. Empty windows yield nothing.
    pub fn day_keys(&self, reference: NaiveDate) -> Vec<DateKey> {
        let Some((start, end)) = self.bounds(reference) else {
            return Vec::new();
        };
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .map(DateKey::from_date)
            .collect()
    }
}
