//! Recurring prog schedules
//!
//! A [`ProgSchedule`] runs a prog with no arguments every time its interval
//! comes round on the game calendar. Each schedule keeps exactly one armed
//! one-shot event with the [`TemporalService`]; firing runs the prog,
//! advances the reference time and arms the next event. Deleting cancels
//! the armed event, so nothing fires after deletion.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use prog_compiler::ProgId;
use prog_types::CalendarTime;

use crate::calendar::{GameClock, RecurringInterval};
use crate::engine::Engine;
use crate::error::{Result, RuntimeError};
use crate::host::Host;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScheduleId(pub u64);

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schedule #{}", self.0)
    }
}

/// Handle of an armed one-shot event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventHandle(pub u64);

/// The calendar and event service schedules run against.
pub trait TemporalService {
    fn now(&self) -> CalendarTime;

    /// The first occurrence of `interval` strictly after `reference`.
    fn next_occurrence(&self, interval: &RecurringInterval, reference: CalendarTime) -> CalendarTime;

    /// Arrange for `schedule` to come due once at `at`.
    fn arm(&mut self, at: CalendarTime, schedule: ScheduleId) -> EventHandle;

    /// Cancel an armed event. Returns whether it was still pending.
    fn cancel(&mut self, handle: EventHandle) -> bool;
}

/// Persisted shape of a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub id: ScheduleId,
    pub name: String,
    pub prog: ProgId,
    pub interval: RecurringInterval,
    pub reference: CalendarTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgSchedule {
    pub id: ScheduleId,
    pub name: String,
    pub prog: ProgId,
    pub interval: RecurringInterval,
    /// The time the interval is counted from: creation time, then the
    /// time of each firing.
    pub reference: CalendarTime,
    next_fire: CalendarTime,
    pending: Option<EventHandle>,
}

impl ProgSchedule {
    pub fn next_fire(&self) -> CalendarTime {
        self.next_fire
    }

    pub fn pending(&self) -> Option<EventHandle> {
        self.pending
    }

    pub fn record(&self) -> ScheduleRecord {
        ScheduleRecord {
            id: self.id,
            name: self.name.clone(),
            prog: self.prog,
            interval: self.interval,
            reference: self.reference,
        }
    }
}

/// A schedule that came due and ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    pub schedule: ScheduleId,
    pub prog: ProgId,
    pub at: CalendarTime,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    schedules: IndexMap<ScheduleId, ProgSchedule>,
    next_id: u64,
}

/// Next occurrence after `reference`, failing if the interval does not move
/// time forward.
fn advance(
    service: &dyn TemporalService,
    interval: &RecurringInterval,
    reference: CalendarTime,
) -> Result<CalendarTime> {
    let next = service.next_occurrence(interval, reference);
    if next <= reference {
        return Err(RuntimeError::Interval(format!(
            "'{}' does not advance past {}",
            interval, reference
        )));
    }
    Ok(next)
}

/// First occurrence after `reference` that is still in the future, along
/// with the reference it is counted from. Missed occurrences are skipped.
fn catch_up(
    service: &dyn TemporalService,
    interval: &RecurringInterval,
    mut reference: CalendarTime,
) -> Result<(CalendarTime, CalendarTime, u64)> {
    let now = service.now();
    let mut next = advance(service, interval, reference)?;
    let mut skipped = 0;
    while next <= now {
        reference = next;
        next = advance(service, interval, reference)?;
        skipped += 1;
    }
    Ok((reference, next, skipped))
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a schedule for `prog` counting from `reference`, and arm its
    /// first firing.
    pub fn schedule(
        &mut self,
        service: &mut dyn TemporalService,
        name: impl Into<String>,
        prog: ProgId,
        interval: RecurringInterval,
        reference: CalendarTime,
    ) -> Result<ScheduleId> {
        self.next_id += 1;
        let record = ScheduleRecord {
            id: ScheduleId(self.next_id),
            name: name.into(),
            prog,
            interval,
            reference,
        };
        let id = self.restore(service, record)?;
        info!(schedule = %id, prog = %prog, %interval, "schedule created");
        Ok(id)
    }

    /// Re-create a persisted schedule. Occurrences that passed while it was
    /// not running are skipped without running the prog.
    pub fn restore(&mut self, service: &mut dyn TemporalService, record: ScheduleRecord) -> Result<ScheduleId> {
        if self.schedules.contains_key(&record.id) {
            return Err(RuntimeError::Interval(format!("{} already exists", record.id)));
        }
        let (reference, next_fire, skipped) = catch_up(service, &record.interval, record.reference)?;
        if skipped > 0 {
            warn!(schedule = %record.id, skipped, "missed firings skipped");
        }
        let handle = service.arm(next_fire, record.id);
        self.next_id = self.next_id.max(record.id.0);
        self.schedules.insert(
            record.id,
            ProgSchedule {
                id: record.id,
                name: record.name,
                prog: record.prog,
                interval: record.interval,
                reference,
                next_fire,
                pending: Some(handle),
            },
        );
        Ok(record.id)
    }

    /// Run a schedule's prog now, then advance and re-arm it.
    ///
    /// The event that triggered the firing is retired before the next one is
    /// computed, so a failed re-arm leaves the schedule with no pending event
    /// rather than a stale one.
    pub fn fire(
        &mut self,
        id: ScheduleId,
        engine: &mut Engine,
        host: &mut dyn Host,
        service: &mut dyn TemporalService,
    ) -> Result<()> {
        let schedule = self.schedules.get_mut(&id).ok_or(RuntimeError::UnknownSchedule(id))?;
        let at = schedule.next_fire;
        debug!(schedule = %id, prog = %schedule.prog, at = %at, "schedule firing");

        // The return value is not used.
        engine.execute(host, schedule.prog, &[]);

        if let Some(old) = schedule.pending.take() {
            service.cancel(old);
        }
        schedule.reference = at;
        let next_fire = advance(service, &schedule.interval, at)?;
        schedule.next_fire = next_fire;
        schedule.pending = Some(service.arm(next_fire, id));
        Ok(())
    }

    /// Cancel a schedule's pending event and forget it.
    pub fn delete(&mut self, id: ScheduleId, service: &mut dyn TemporalService) -> Result<ProgSchedule> {
        let mut schedule = self
            .schedules
            .shift_remove(&id)
            .ok_or(RuntimeError::UnknownSchedule(id))?;
        if let Some(handle) = schedule.pending.take() {
            service.cancel(handle);
        }
        info!(schedule = %id, "schedule deleted");
        Ok(schedule)
    }

    pub fn get(&self, id: ScheduleId) -> Option<&ProgSchedule> {
        self.schedules.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProgSchedule> {
        self.schedules.values()
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }

    pub fn records(&self) -> Vec<ScheduleRecord> {
        self.schedules.values().map(ProgSchedule::record).collect()
    }

    /// Drive `clock` forward to `until`, firing every schedule that comes
    /// due on the way, in time order. A schedule that cannot be re-armed
    /// after it fires is logged and left idle; the other schedules keep
    /// running.
    pub fn run_until(
        &mut self,
        clock: &mut GameClock,
        engine: &mut Engine,
        host: &mut dyn Host,
        until: CalendarTime,
    ) -> Result<Vec<Firing>> {
        let mut firings = Vec::new();
        while let Some((at, handle, id)) = clock.pop_due(until) {
            let Some(schedule) = self.schedules.get(&id) else {
                continue;
            };
            if schedule.pending != Some(handle) {
                continue;
            }
            let prog = schedule.prog;
            clock.set_now(at);
            let fired = self.fire(id, engine, host, clock);
            firings.push(Firing { schedule: id, prog, at });
            if let Err(error) = fired {
                warn!(schedule = %id, %error, "schedule could not be re-armed");
            }
        }
        clock.set_now(until);
        Ok(firings)
    }
}
