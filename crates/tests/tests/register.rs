//! Variable Register access from prog code.

use prog_runtime::RuntimeError;
use prog_tests::{TestHarness, character, num, text};
use prog_types::{BaseType, EntityRef, NativeValue, TypeDescriptor, Value};

fn harness() -> TestHarness {
    let mut h = TestHarness::new();
    let register = h.engine.register_mut();
    register
        .register_property(BaseType::Character, "mood", TypeDescriptor::TEXT, Some(Value::text("calm")))
        .unwrap();
    register
        .register_property(
            BaseType::Character,
            "visits",
            TypeDescriptor::sequence_of(BaseType::Location),
            None,
        )
        .unwrap();
    h
}

#[test]
fn test_default_then_stored_value() {
    let mut h = harness();
    let mood = h.prog("mood_of", "text", &["character ch"], "return getregister(ch, \"mood\")");
    let anger = h.prog(
        "anger",
        "boolean",
        &["character ch"],
        "return setregister(ch, \"mood\", \"angry\")",
    );

    assert_eq!(h.run(mood, &[character(1)]), text("calm"));
    assert_eq!(h.run(anger, &[character(1)]), NativeValue::Boolean(true));
    assert_eq!(h.run(mood, &[character(1)]), text("angry"));
    assert_eq!(h.run(mood, &[character(2)]), text("calm"));
}

#[test]
fn test_unset_collection_reads_empty() {
    let mut h = harness();
    let id = h.prog(
        "visit_count",
        "number",
        &["character ch"],
        "return count(getregister(ch, \"visits\"))",
    );
    assert_eq!(h.run(id, &[character(1)]), num(0.0));
    assert!(h.incidents().is_empty());
}

#[test]
fn test_unknown_property_rejected_at_compile_time() {
    let mut h = harness();
    let result = h.try_prog("hunger", "number", &["character ch"], "return getregister(ch, \"hunger\")");
    match result {
        Err(RuntimeError::Compile { error, .. }) => assert!(error.message.contains("hunger")),
        other => panic!("expected a compile error, got {:?}", other),
    }
}

#[test]
fn test_wrong_value_type_rejected_at_compile_time() {
    let mut h = harness();
    let result = h.try_prog(
        "bad_mood",
        "boolean",
        &["character ch"],
        "return setregister(ch, \"mood\", 3)",
    );
    assert!(matches!(result, Err(RuntimeError::Compile { .. })));
}

#[test]
fn test_wrong_value_type_rejected_at_runtime() {
    let mut h = harness();
    let alice = EntityRef::new(BaseType::Character, 1);
    let register = h.engine.register_mut();
    assert!(register.set(alice, "mood", Value::number(3.0)).is_err());
    assert_eq!(register.get(alice, "mood").unwrap(), Value::text("calm"));
}

#[test]
fn test_purged_entity_falls_back_to_default() {
    let mut h = harness();
    let alice = EntityRef::new(BaseType::Character, 1);
    let anger = h.prog(
        "anger",
        "boolean",
        &["character ch"],
        "return setregister(ch, \"mood\", \"angry\")",
    );
    h.run(anger, &[character(1)]);
    assert_eq!(h.engine.register_mut().purge_entity(alice), 1);
    assert_eq!(h.engine.register().get(alice, "mood").unwrap(), Value::text("calm"));
}

#[test]
fn test_property_on_union_category_rejected() {
    let mut h = TestHarness::new();
    let result = h.engine.register_mut().register_property(
        BaseType::Perceiver,
        "mood",
        TypeDescriptor::TEXT,
        None,
    );
    assert!(result.is_err());
}
