//! Consultation slot value object.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every consultation runs for exactly one hour.
pub const SLOT_DURATION_HOURS: i64 = 1;

/// A fixed one-hour interval on a given date for a given advisor.
///
/// Only the start time is stored; the end time is always derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub start: NaiveTime,
}

impl Slot {
    pub fn new(date: NaiveDate, start: NaiveTime) -> Self {
        Self { date, start }
    }

    /// End of the slot: start plus one hour.
    pub fn end(&self) -> NaiveTime {
        self.start + Duration::hours(SLOT_DURATION_HOURS)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}~{}", self.date, self.start.format("%H:%M"), self.end().format("%H:%M"))
    }
}
