//! Reference clock: where "today" comes from.

use chrono::{Local, NaiveDate};

pub trait ReferenceClock {
    /// Today's local calendar date.
    fn today(&self) -> NaiveDate;
}

/// Reads the host's local date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ReferenceClock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl ReferenceClock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: ReferenceClock + ?Sized> ReferenceClock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

impl<C: ReferenceClock + ?Sized> ReferenceClock for Box<C> {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
