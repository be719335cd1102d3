//! In-world time values
//!
//! The game runs on its own calendar, so these are counts of in-world seconds
//! rather than wall-clock instants. Breaking a timestamp into calendar units
//! is the calendar's job, not the value's.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A point on the in-world calendar, in seconds since the calendar epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalendarTime(pub i64);

impl CalendarTime {
    pub const EPOCH: CalendarTime = CalendarTime(0);

    pub fn seconds(self) -> i64 {
        self.0
    }
}

/// A signed in-world duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSpan(pub i64);

impl TimeSpan {
    pub const ZERO: TimeSpan = TimeSpan(0);

    pub fn seconds(self) -> i64 {
        self.0
    }

    /// Scale by a factor, rounding to the nearest second.
    pub fn scale(self, factor: f64) -> TimeSpan {
        TimeSpan((self.0 as f64 * factor).round() as i64)
    }
}

impl Add<TimeSpan> for CalendarTime {
    type Output = CalendarTime;

    fn add(self, rhs: TimeSpan) -> CalendarTime {
        CalendarTime(self.0.saturating_add(rhs.0))
    }
}

impl Sub<TimeSpan> for CalendarTime {
    type Output = CalendarTime;

    fn sub(self, rhs: TimeSpan) -> CalendarTime {
        CalendarTime(self.0.saturating_sub(rhs.0))
    }
}

impl Sub for CalendarTime {
    type Output = TimeSpan;

    fn sub(self, rhs: CalendarTime) -> TimeSpan {
        TimeSpan(self.0.saturating_sub(rhs.0))
    }
}

impl Add for TimeSpan {
    type Output = TimeSpan;

    fn add(self, rhs: TimeSpan) -> TimeSpan {
        TimeSpan(self.0.saturating_add(rhs.0))
    }
}

impl Sub for TimeSpan {
    type Output = TimeSpan;

    fn sub(self, rhs: TimeSpan) -> TimeSpan {
        TimeSpan(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for CalendarTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
