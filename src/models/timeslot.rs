//! Timeslot model.
//!
//! A timeslot is one weekly teaching period: a day of the week plus a
//! start and end time of day. Timeslots form the value range a lesson's
//! assignment is drawn from.
//!
//! # Identity
//! Equality and hashing use `(id, day, start, end)`. The timing-group tag
//! is descriptive only and never participates in comparisons, so two
//! copies of a slot taken from different problem snapshots compare equal.

use std::hash::{Hash, Hasher};

use chrono::{NaiveTime, TimeDelta, Weekday};
use serde::{Deserialize, Serialize};

/// Largest gap between two periods that still counts as back-to-back.
pub const ADJACENCY_WINDOW_MINUTES: i64 = 30;

/// A weekly teaching period.
///
/// Immutable once built; lessons hold copies of the slot they occupy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeslot {
    /// Unique timeslot identifier.
    pub id: String,
    /// Day of the week (Monday–Saturday).
    pub day: Weekday,
    /// Period start (inclusive).
    pub start: NaiveTime,
    /// Period end (exclusive).
    pub end: NaiveTime,
    /// School-timing group this period was expanded from.
    #[serde(default)]
    pub timing_group: Option<String>,
}

impl Timeslot {
    /// Creates a timeslot outside of any timing group.
    pub fn new(id: impl Into<String>, day: Weekday, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            id: id.into(),
            day,
            start,
            end,
            timing_group: None,
        }
    }

    /// Tags the slot with its school-timing group.
    pub fn with_timing_group(mut self, group: impl Into<String>) -> Self {
        self.timing_group = Some(group.into());
        self
    }

    /// Period length.
    #[inline]
    pub fn duration(&self) -> TimeDelta {
        self.end.signed_duration_since(self.start)
    }

    /// Whether `start < end`.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }

    /// Whether the slot falls on a school day (Monday–Saturday).
    #[inline]
    pub fn is_school_day(&self) -> bool {
        self.day != Weekday::Sun
    }

    /// Gap from the end of `self` to the start of `next`.
    ///
    /// Negative when `next` starts before `self` ends.
    #[inline]
    pub fn gap_until(&self, next: &Timeslot) -> TimeDelta {
        next.start.signed_duration_since(self.end)
    }

    /// Whether `next` follows `self` on the same day with a gap in
    /// `[0, ADJACENCY_WINDOW_MINUTES]`.
    pub fn is_followed_by(&self, next: &Timeslot) -> bool {
        if self.day != next.day {
            return false;
        }
        let gap = self.gap_until(next);
        gap >= TimeDelta::zero() && gap <= TimeDelta::minutes(ADJACENCY_WINDOW_MINUTES)
    }

    /// Day index with Monday = 0, usable as an ordered grouping key.
    #[inline]
    pub fn day_index(&self) -> u32 {
        self.day.num_days_from_monday()
    }
}

impl PartialEq for Timeslot {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.day == other.day
            && self.start == other.start
            && self.end == other.end
    }
}

impl Eq for Timeslot {}

impl Hash for Timeslot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.day.hash(state);
        self.start.hash(state);
        self.end.hash(state);
    }
}

#[cfg(test)]
pub(crate) fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}
