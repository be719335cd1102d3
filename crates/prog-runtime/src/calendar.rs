//! In-world calendar and clock
//!
//! Schedules recur on the game's calendar, not the wall clock. A
//! [`RecurringInterval`] says how often ("every 3 days"); a [`GameCalendar`]
//! says how long a day is; a [`GameClock`] keeps the current in-world time
//! and a queue of one-shot events, serving as the [`TemporalService`] the
//! scheduler arms against.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use prog_types::{CalendarTime, TimeSpan};

use crate::config::ConfigError;
use crate::error::RuntimeError;
use crate::schedule::{EventHandle, ScheduleId, TemporalService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl IntervalUnit {
    /// Parse a unit word, singular or plural.
    pub fn from_word(word: &str) -> Option<Self> {
        let word = word.to_ascii_lowercase();
        let singular = word.strip_suffix('s').unwrap_or(&word);
        Some(match singular {
            "minute" => IntervalUnit::Minute,
            "hour" => IntervalUnit::Hour,
            "day" => IntervalUnit::Day,
            "week" => IntervalUnit::Week,
            "month" => IntervalUnit::Month,
            "year" => IntervalUnit::Year,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            IntervalUnit::Minute => "minute",
            IntervalUnit::Hour => "hour",
            IntervalUnit::Day => "day",
            IntervalUnit::Week => "week",
            IntervalUnit::Month => "month",
            IntervalUnit::Year => "year",
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// "Every N units" on the game calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringInterval {
    pub every: u32,
    pub unit: IntervalUnit,
}

impl RecurringInterval {
    pub fn new(every: u32, unit: IntervalUnit) -> Result<Self, RuntimeError> {
        if every == 0 {
            return Err(RuntimeError::Interval("an interval must be at least 1".into()));
        }
        Ok(Self { every, unit })
    }

    /// Parse `every <n> <units>` or `every <unit>`.
    pub fn parse(text: &str) -> Result<Self, RuntimeError> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let bad = || RuntimeError::Interval(format!("expected 'every [n] <unit>', found '{}'", text));
        match words.as_slice() {
            [every, unit] if every.eq_ignore_ascii_case("every") => {
                let unit = IntervalUnit::from_word(unit).ok_or_else(bad)?;
                Self::new(1, unit)
            }
            [every, n, unit] if every.eq_ignore_ascii_case("every") => {
                let n: u32 = n.parse().map_err(|_| bad())?;
                let unit = IntervalUnit::from_word(unit).ok_or_else(bad)?;
                Self::new(n, unit)
            }
            _ => Err(bad()),
        }
    }
}

impl FromStr for RecurringInterval {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RecurringInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.every == 1 {
            write!(f, "every {}", self.unit)
        } else {
            write!(f, "every {} {}s", self.every, self.unit)
        }
    }
}

/// Unit lengths of the game calendar. Months and years have a fixed
/// number of days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameCalendar {
    pub seconds_per_minute: i64,
    pub minutes_per_hour: i64,
    pub hours_per_day: i64,
    pub days_per_week: i64,
    pub days_per_month: i64,
    pub months_per_year: i64,
}

impl Default for GameCalendar {
    fn default() -> Self {
        Self {
            seconds_per_minute: 60,
            minutes_per_hour: 60,
            hours_per_day: 24,
            days_per_week: 7,
            days_per_month: 30,
            months_per_year: 12,
        }
    }
}

impl GameCalendar {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let calendar: GameCalendar = serde_json::from_str(text)?;
        calendar.validate()?;
        Ok(calendar)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("seconds_per_minute", self.seconds_per_minute),
            ("minutes_per_hour", self.minutes_per_hour),
            ("hours_per_day", self.hours_per_day),
            ("days_per_week", self.days_per_week),
            ("days_per_month", self.days_per_month),
            ("months_per_year", self.months_per_year),
        ];
        for (name, value) in fields {
            if value < 1 {
                return Err(ConfigError::Invalid(format!("{} must be at least 1", name)));
            }
        }
        Ok(())
    }

    pub fn unit_length(&self, unit: IntervalUnit) -> TimeSpan {
        let minute = self.seconds_per_minute;
        let hour = minute * self.minutes_per_hour;
        let day = hour * self.hours_per_day;
        TimeSpan(match unit {
            IntervalUnit::Minute => minute,
            IntervalUnit::Hour => hour,
            IntervalUnit::Day => day,
            IntervalUnit::Week => day * self.days_per_week,
            IntervalUnit::Month => day * self.days_per_month,
            IntervalUnit::Year => day * self.days_per_month * self.months_per_year,
        })
    }

    pub fn span(&self, interval: &RecurringInterval) -> TimeSpan {
        self.unit_length(interval.unit).scale(f64::from(interval.every))
    }

    /// The first occurrence strictly after `reference`.
    pub fn next_after(&self, interval: &RecurringInterval, reference: CalendarTime) -> CalendarTime {
        reference + self.span(interval)
    }
}

/// In-process [`TemporalService`]: a settable clock plus an ordered queue of
/// one-shot events.
#[derive(Debug)]
pub struct GameClock {
    calendar: GameCalendar,
    now: CalendarTime,
    queue: BTreeMap<(CalendarTime, EventHandle), ScheduleId>,
    /// Due time of every armed handle, for cancellation.
    armed: HashMap<EventHandle, CalendarTime>,
    next_handle: u64,
}

impl GameClock {
    pub fn new(calendar: GameCalendar, now: CalendarTime) -> Self {
        Self {
            calendar,
            now,
            queue: BTreeMap::new(),
            armed: HashMap::new(),
            next_handle: 0,
        }
    }

    pub fn calendar(&self) -> &GameCalendar {
        &self.calendar
    }

    pub fn set_now(&mut self, now: CalendarTime) {
        self.now = now;
    }

    /// Number of armed events.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Time of the earliest armed event.
    pub fn next_due(&self) -> Option<CalendarTime> {
        self.queue.keys().next().map(|(at, _)| *at)
    }

    /// Remove and return the earliest event due at or before `until`.
    pub fn pop_due(&mut self, until: CalendarTime) -> Option<(CalendarTime, EventHandle, ScheduleId)> {
        let (&(at, handle), _) = self.queue.iter().next()?;
        if at > until {
            return None;
        }
        let schedule = self.queue.remove(&(at, handle))?;
        self.armed.remove(&handle);
        Some((at, handle, schedule))
    }

    /// Move the clock to `time`, returning the schedules whose events came
    /// due on the way, earliest first.
    pub fn advance_to(&mut self, time: CalendarTime) -> Vec<ScheduleId> {
        let mut due = Vec::new();
        while let Some((_, _, schedule)) = self.pop_due(time) {
            due.push(schedule);
        }
        self.now = time;
        due
    }
}

impl TemporalService for GameClock {
    fn now(&self) -> CalendarTime {
        self.now
    }

    fn next_occurrence(&self, interval: &RecurringInterval, reference: CalendarTime) -> CalendarTime {
        self.calendar.next_after(interval, reference)
    }

    fn arm(&mut self, at: CalendarTime, schedule: ScheduleId) -> EventHandle {
        let handle = EventHandle(self.next_handle);
        self.next_handle += 1;
        self.queue.insert((at, handle), schedule);
        self.armed.insert(handle, at);
        trace!(%schedule, at = %at, "event armed");
        handle
    }

    fn cancel(&mut self, handle: EventHandle) -> bool {
        match self.armed.remove(&handle) {
            Some(at) => self.queue.remove(&(at, handle)).is_some(),
            None => false,
        }
    }
}
