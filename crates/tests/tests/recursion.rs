//! Recursion ceiling.

use prog_runtime::{DEFAULT_MAX_RECURSION_DEPTH, EngineConfig, IncidentKind};
use prog_tests::{TestHarness, num};
use prog_types::NativeValue;

const COUNTDOWN: &str = "\
if n <= 0
  return 0
else
  return 1 + @countdown(n - 1)
end if";

#[test]
fn test_unbounded_recursion_hits_ceiling_once() {
    let mut h = TestHarness::new();
    let id = h.prog("spiral", "number", &["number n"], "return @spiral(n + 1)");
    assert_eq!(h.run(id, &[num(0.0)]), NativeValue::Null);

    let incidents = h.incidents();
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].kind, IncidentKind::RecursionLimit);
    assert_eq!(incidents[0].prog_name, "spiral");
}

#[test]
fn test_runaway_recursion_on_small_thread_stack() {
    // Smaller than the default test thread stack.
    let worker = std::thread::Builder::new()
        .stack_size(512 * 1024)
        .spawn(|| {
            let mut h = TestHarness::new();
            let id = h.prog(
                "spiral",
                "number",
                &["number n"],
                "var next as number = n + 1\nif next > 0\n  return @spiral(next)\nelse\n  return 0\nend if",
            );
            let result = h.run(id, &[num(0.0)]);
            (result, h.incidents_of(IncidentKind::RecursionLimit).len())
        })
        .unwrap();
    assert_eq!(worker.join().unwrap(), (NativeValue::Null, 1));
}

#[test]
fn test_recursion_below_ceiling_completes() {
    let mut h = TestHarness::new();
    let id = h.prog("countdown", "number", &["number n"], COUNTDOWN);
    let depth = (DEFAULT_MAX_RECURSION_DEPTH - 10) as f64;
    assert_eq!(h.run(id, &[num(depth)]), num(depth));
    assert!(h.incidents().is_empty());
}

#[test]
fn test_configured_ceiling() {
    let config = EngineConfig {
        max_recursion_depth: 10,
        ..EngineConfig::default()
    };
    let mut h = TestHarness::with_config(config);
    let id = h.prog("countdown", "number", &["number n"], COUNTDOWN);

    // The root call plus nine nested calls fits.
    assert_eq!(h.run(id, &[num(9.0)]), num(9.0));
    assert!(h.incidents().is_empty());

    assert_eq!(h.run(id, &[num(10.0)]), NativeValue::Null);
    let incidents = h.incidents_of(IncidentKind::RecursionLimit);
    assert_eq!(incidents.len(), 1);
    assert_eq!(h.incidents().len(), 1);
}

#[test]
fn test_ceiling_resets_between_executions() {
    let config = EngineConfig {
        max_recursion_depth: 5,
        ..EngineConfig::default()
    };
    let mut h = TestHarness::with_config(config);
    let id = h.prog("countdown", "number", &["number n"], COUNTDOWN);
    for _ in 0..3 {
        assert_eq!(h.run(id, &[num(4.0)]), num(4.0));
    }
    assert!(h.incidents().is_empty());
}
