//! Recurring execution on the game calendar.

use prog_compiler::ProgId;
use prog_runtime::{GameCalendar, GameClock, IntervalUnit, RecurringInterval, Scheduler};
use prog_tests::{TestHarness, world_entity};
use prog_types::{BaseType, CalendarTime, TypeDescriptor, Value};

const HOUR: i64 = 3600;

fn at_hour(h: i64) -> CalendarTime {
    CalendarTime(h * HOUR)
}

/// A harness with a `tick` prog that counts its runs on the world zone.
fn ticking() -> (TestHarness, ProgId) {
    let mut h = TestHarness::new();
    h.engine
        .register_mut()
        .register_property(BaseType::Zone, "ticks", TypeDescriptor::NUMBER, Some(Value::number(0.0)))
        .unwrap();
    let id = h.prog(
        "tick",
        "boolean",
        &[],
        "return setregister(world(), \"ticks\", getregister(world(), \"ticks\") + 1)",
    );
    (h, id)
}

fn ticks(h: &TestHarness) -> Value {
    h.engine.register().get(world_entity(), "ticks").unwrap()
}

fn hourly() -> RecurringInterval {
    RecurringInterval::new(1, IntervalUnit::Hour).unwrap()
}

#[test]
fn test_hourly_schedule_fires_each_hour() {
    let (mut h, tick) = ticking();
    let mut clock = GameClock::new(GameCalendar::default(), CalendarTime::EPOCH);
    let mut scheduler = Scheduler::new();
    let id = scheduler
        .schedule(&mut clock, "tick", tick, hourly(), CalendarTime::EPOCH)
        .unwrap();

    let firings = scheduler
        .run_until(&mut clock, &mut h.engine, &mut h.host, at_hour(5))
        .unwrap();
    assert_eq!(firings.len(), 5);
    assert_eq!(firings[0].at, at_hour(1));
    assert_eq!(firings[4].at, at_hour(5));
    assert_eq!(ticks(&h), Value::number(5.0));

    let schedule = scheduler.get(id).unwrap();
    assert_eq!(schedule.reference, at_hour(5));
    assert_eq!(schedule.next_fire(), at_hour(6));
    assert_eq!(clock.pending(), 1);
}

#[test]
fn test_interval_in_days() {
    let (mut h, tick) = ticking();
    let mut clock = GameClock::new(GameCalendar::default(), CalendarTime::EPOCH);
    let mut scheduler = Scheduler::new();
    let every_two_days = RecurringInterval::parse("every 2 days").unwrap();
    scheduler
        .schedule(&mut clock, "tick", tick, every_two_days, CalendarTime::EPOCH)
        .unwrap();

    scheduler
        .run_until(&mut clock, &mut h.engine, &mut h.host, at_hour(24 * 7))
        .unwrap();
    assert_eq!(ticks(&h), Value::number(3.0));
}

#[test]
fn test_deleted_schedule_never_fires_again() {
    let (mut h, tick) = ticking();
    let mut clock = GameClock::new(GameCalendar::default(), CalendarTime::EPOCH);
    let mut scheduler = Scheduler::new();
    let id = scheduler
        .schedule(&mut clock, "tick", tick, hourly(), CalendarTime::EPOCH)
        .unwrap();

    scheduler
        .run_until(&mut clock, &mut h.engine, &mut h.host, at_hour(2))
        .unwrap();
    scheduler.delete(id, &mut clock).unwrap();
    assert!(scheduler.is_empty());
    assert_eq!(clock.pending(), 0);

    let firings = scheduler
        .run_until(&mut clock, &mut h.engine, &mut h.host, at_hour(10))
        .unwrap();
    assert!(firings.is_empty());
    assert_eq!(ticks(&h), Value::number(2.0));
}

#[test]
fn test_two_schedules_interleave_in_time_order() {
    let (mut h, tick) = ticking();
    let mut clock = GameClock::new(GameCalendar::default(), CalendarTime::EPOCH);
    let mut scheduler = Scheduler::new();
    let fast = scheduler
        .schedule(&mut clock, "fast", tick, hourly(), CalendarTime::EPOCH)
        .unwrap();
    let slow = scheduler
        .schedule(
            &mut clock,
            "slow",
            tick,
            RecurringInterval::new(3, IntervalUnit::Hour).unwrap(),
            CalendarTime::EPOCH,
        )
        .unwrap();

    let firings = scheduler
        .run_until(&mut clock, &mut h.engine, &mut h.host, at_hour(6))
        .unwrap();
    assert_eq!(firings.len(), 8);
    assert!(firings.windows(2).all(|pair| pair[0].at <= pair[1].at));
    assert_eq!(firings.iter().filter(|f| f.schedule == slow).count(), 2);
    assert_eq!(firings.iter().filter(|f| f.schedule == fast).count(), 6);
    assert_eq!(clock.pending(), 2);
}

#[test]
fn test_faulting_prog_keeps_schedule_alive() {
    let mut h = TestHarness::new();
    let broken = h.prog("broken", "number", &[], "return 1 / 0");
    let mut clock = GameClock::new(GameCalendar::default(), CalendarTime::EPOCH);
    let mut scheduler = Scheduler::new();
    scheduler
        .schedule(&mut clock, "broken", broken, hourly(), CalendarTime::EPOCH)
        .unwrap();

    let firings = scheduler
        .run_until(&mut clock, &mut h.engine, &mut h.host, at_hour(3))
        .unwrap();
    assert_eq!(firings.len(), 3);
    assert_eq!(h.incidents().len(), 3);
    assert_eq!(scheduler.len(), 1);
}
