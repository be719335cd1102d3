//! Fully-static result caching.

use prog_tests::{TestHarness, num};
use prog_types::NativeValue;

fn static_prog(h: &mut TestHarness, name: &str, source: &str) -> prog_compiler::ProgId {
    let prog = h.build(name, "number", &["number x"], source).fully_static();
    let id = h.add_built(prog);
    h.engine.compile(id).unwrap();
    id
}

#[test]
fn test_first_result_is_reused_regardless_of_arguments() {
    let mut h = TestHarness::new();
    let id = static_prog(&mut h, "seed", "return x * 10");
    assert_eq!(h.run(id, &[num(1.0)]), num(10.0));
    assert_eq!(h.run(id, &[num(2.0)]), num(10.0));
    assert_eq!(h.engine.static_cache().len(), 1);
}

#[test]
fn test_ordinary_prog_is_not_cached() {
    let mut h = TestHarness::new();
    let id = h.prog("plain", "number", &["number x"], "return x * 10");
    assert_eq!(h.run(id, &[num(1.0)]), num(10.0));
    assert_eq!(h.run(id, &[num(2.0)]), num(20.0));
    assert!(h.engine.static_cache().is_empty());
}

#[test]
fn test_recompile_discards_cached_result() {
    let mut h = TestHarness::new();
    let id = static_prog(&mut h, "seed", "return x * 10");
    assert_eq!(h.run(id, &[num(1.0)]), num(10.0));

    h.engine.compile(id).unwrap();
    assert!(h.engine.static_cache().is_empty());
    assert_eq!(h.run(id, &[num(2.0)]), num(20.0));
}

#[test]
fn test_faulted_run_is_not_cached() {
    let mut h = TestHarness::new();
    let id = static_prog(&mut h, "ratio", "return 10 / x");
    assert_eq!(h.run(id, &[num(0.0)]), NativeValue::Null);
    assert!(h.engine.static_cache().is_empty());

    assert_eq!(h.run(id, &[num(2.0)]), num(5.0));
    assert_eq!(h.run(id, &[num(5.0)]), num(5.0));
}

#[test]
fn test_cached_static_prog_called_from_another_prog() {
    let mut h = TestHarness::new();
    static_prog(&mut h, "base", "return x + 100");
    let id = h.prog("twice", "number", &["number y"], "return @base(y) + @base(y + 1)");
    assert_eq!(h.run(id, &[num(1.0)]), num(202.0));
}
