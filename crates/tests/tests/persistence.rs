//! Saving and restoring the whole engine state.

use prog_runtime::{GameCalendar, GameClock, IntervalUnit, RecurringInterval, Scheduler, Snapshot};
use prog_tests::{TestHarness, character, num, text, world_entity};
use prog_types::{BaseType, CalendarTime, TypeDescriptor, Value};

const HOUR: i64 = 3600;

fn world(h: &mut TestHarness) {
    let register = h.engine.register_mut();
    register
        .register_property(BaseType::Zone, "ticks", TypeDescriptor::NUMBER, Some(Value::number(0.0)))
        .unwrap();
    register
        .register_property(BaseType::Character, "mood", TypeDescriptor::TEXT, Some(Value::text("calm")))
        .unwrap();
}

#[test]
fn test_snapshot_file_round_trip_resumes_schedules() {
    let mut h = TestHarness::new();
    world(&mut h);
    let tick = h.prog(
        "tick",
        "boolean",
        &[],
        "return setregister(world(), \"ticks\", getregister(world(), \"ticks\") + 1)",
    );
    h.prog("mood_of", "text", &["character ch"], "return getregister(ch, \"mood\")");
    let anger = h.prog(
        "anger",
        "boolean",
        &["character ch"],
        "return setregister(ch, \"mood\", \"angry\")",
    );
    h.run(anger, &[character(4)]);

    let mut clock = GameClock::new(GameCalendar::default(), CalendarTime::EPOCH);
    let mut scheduler = Scheduler::new();
    let hourly = RecurringInterval::new(1, IntervalUnit::Hour).unwrap();
    scheduler
        .schedule(&mut clock, "tick", tick, hourly, CalendarTime::EPOCH)
        .unwrap();
    scheduler
        .run_until(&mut clock, &mut h.engine, &mut h.host, CalendarTime(3 * HOUR))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("world.json");
    Snapshot::capture(&h.engine, &scheduler).save_json(&path).unwrap();

    // Later: a fresh process, with the clock well past the last firing.
    let mut restored = TestHarness::new();
    let mut clock = GameClock::new(GameCalendar::default(), CalendarTime(10 * HOUR + HOUR / 2));
    let mut scheduler = Scheduler::new();
    let failures = Snapshot::load_json(&path)
        .unwrap()
        .restore_into(&mut restored.engine, &mut scheduler, &mut clock)
        .unwrap();
    assert!(failures.is_empty());

    assert_eq!(
        restored.engine.register().get(world_entity(), "ticks").unwrap(),
        Value::number(3.0)
    );
    let mood = restored.engine.prog_by_name("mood_of").map(|p| p.id).unwrap();
    assert_eq!(restored.run(mood, &[character(4)]), text("angry"));

    // Missed hours are skipped; the next firing is the first one still ahead.
    let schedule = scheduler.iter().next().unwrap();
    assert_eq!(schedule.next_fire(), CalendarTime(11 * HOUR));

    scheduler
        .run_until(&mut clock, &mut restored.engine, &mut restored.host, CalendarTime(12 * HOUR))
        .unwrap();
    assert_eq!(
        restored.engine.register().get(world_entity(), "ticks").unwrap(),
        Value::number(5.0)
    );
}

#[test]
fn test_new_schedule_after_restore_gets_fresh_id() {
    let mut h = TestHarness::new();
    let id = h.prog("noop", "void", &[], "return");
    let mut clock = GameClock::new(GameCalendar::default(), CalendarTime::EPOCH);
    let mut scheduler = Scheduler::new();
    let hourly = RecurringInterval::new(1, IntervalUnit::Hour).unwrap();
    let first = scheduler
        .schedule(&mut clock, "noop", id, hourly, CalendarTime::EPOCH)
        .unwrap();

    let bytes = Snapshot::capture(&h.engine, &scheduler).to_bytes().unwrap();
    let mut restored = TestHarness::new();
    let mut clock = GameClock::new(GameCalendar::default(), CalendarTime::EPOCH);
    let mut scheduler = Scheduler::new();
    Snapshot::from_bytes(&bytes)
        .unwrap()
        .restore_into(&mut restored.engine, &mut scheduler, &mut clock)
        .unwrap();

    let second = scheduler
        .schedule(&mut clock, "noop again", id, hourly, CalendarTime::EPOCH)
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(scheduler.len(), 2);
}

#[test]
fn test_uncompilable_prog_survives_restore() {
    let mut h = TestHarness::new();
    h.add("draft", "number", &[], "return");
    let ok = h.prog("ready", "number", &[], "return 7");

    let json = Snapshot::capture(&h.engine, &Scheduler::new()).to_json().unwrap();
    let mut restored = TestHarness::new();
    let mut clock = GameClock::new(GameCalendar::default(), CalendarTime::EPOCH);
    let failures = Snapshot::from_json(&json)
        .unwrap()
        .restore_into(&mut restored.engine, &mut Scheduler::new(), &mut clock)
        .unwrap();

    assert_eq!(failures.len(), 1);
    assert_eq!(restored.engine.library().len(), 2);
    assert_eq!(restored.run(ok, &[]), num(7.0));
}
