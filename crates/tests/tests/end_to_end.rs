//! Source text to result, through the host-facing entry point.

use prog_runtime::{ExecutionFault, IncidentKind};
use prog_tests::{TestHarness, character, num, text};
use prog_types::{BaseType, EntityRef, NativeValue, TypeDescriptor, Value};

#[test]
fn test_double() {
    let mut h = TestHarness::new();
    let id = h.prog("double", "number", &["number x"], "return x times 2");
    assert_eq!(h.run(id, &[num(21.0)]), num(42.0));
    assert_eq!(h.run(id, &[NativeValue::Integer(4)]), num(8.0));
    assert!(h.incidents().is_empty());
}

#[test]
fn test_for_loop_with_continue() {
    let mut h = TestHarness::new();
    let source = "\
var total as number = 0
for i = 1 to n
  if i % 2 == 0
    continue
  end if
  total = total + i
end for
return total";
    let id = h.prog("odd_sum", "number", &["number n"], source);
    assert_eq!(h.run(id, &[num(5.0)]), num(9.0));
    assert_eq!(h.run(id, &[num(0.0)]), num(0.0));
}

#[test]
fn test_while_with_break() {
    let mut h = TestHarness::new();
    let source = "\
var i as number = 0
while true
  i = i + 1
  if i >= 10
    break
  end if
end while
return i";
    let id = h.prog("ten", "number", &[], source);
    assert_eq!(h.run(id, &[]), num(10.0));
}

#[test]
fn test_foreach_over_sequence_argument() {
    let mut h = TestHarness::new();
    let source = "\
var sum as number = 0
foreach x in xs
  sum = sum + x
end foreach
return sum";
    let id = h.prog("sum", "number", &["number sequence xs"], source);
    let xs = NativeValue::List(vec![num(1.0), num(2.0), num(3.0)]);
    assert_eq!(h.run(id, &[xs]), num(6.0));
    assert_eq!(h.run(id, &[NativeValue::List(vec![])]), num(0.0));
}

#[test]
fn test_switch_on_text() {
    let mut h = TestHarness::new();
    let source = "\
switch lower(kind)
case \"sword\"
  return 10
case \"dagger\"
  return 4
default
  return 0
end switch";
    let id = h.prog("damage", "number", &["text kind"], source);
    assert_eq!(h.run(id, &[text("Sword")]), num(10.0));
    assert_eq!(h.run(id, &[text("dagger")]), num(4.0));
    assert_eq!(h.run(id, &[text("spoon")]), num(0.0));
}

#[test]
fn test_else_if_chain() {
    let mut h = TestHarness::new();
    let source = "\
if x > 0
  return \"positive\"
else if x < 0
  return \"negative\"
else
  return \"zero\"
end if";
    let id = h.prog("sign", "text", &["number x"], source);
    assert_eq!(h.run(id, &[num(3.0)]), text("positive"));
    assert_eq!(h.run(id, &[num(-3.0)]), text("negative"));
    assert_eq!(h.run(id, &[num(0.0)]), text("zero"));
}

#[test]
fn test_inner_block_updates_outer_variable() {
    let mut h = TestHarness::new();
    let source = "\
var label as text = \"none\"
if flag
  var suffix as text = \"!\"
  label = \"set\" + suffix
end if
return label";
    let id = h.prog("label", "text", &["boolean flag"], source);
    assert_eq!(h.run(id, &[NativeValue::Boolean(true)]), text("set!"));
    assert_eq!(h.run(id, &[NativeValue::Boolean(false)]), text("none"));
}

#[test]
fn test_null_condition_takes_else_branch() {
    let mut h = TestHarness::new();
    let source = "\
if flag
  return 1
else
  return 2
end if";
    let id = h.prog("pick", "number", &["boolean flag"], source);
    assert_eq!(h.run(id, &[]), num(2.0));
    assert!(h.incidents().is_empty());
}

#[test]
fn test_division_by_zero_reports_fault() {
    let mut h = TestHarness::new();
    let id = h.prog("ratio", "number", &["number a", "number b"], "return a / b");
    assert_eq!(h.run(id, &[num(6.0), num(0.0)]), NativeValue::Null);

    let incidents = h.incidents();
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].kind, IncidentKind::Fault);
    assert_eq!(incidents[0].prog_name, "ratio");
    assert_eq!(incidents[0].arguments, vec!["6".to_string(), "0".to_string()]);
}

#[test]
fn test_prog_calls_prog() {
    let mut h = TestHarness::new();
    h.prog("square", "number", &["number x"], "return x * x");
    let id = h.prog("hyp", "number", &["number a", "number b"], "return @square(a) + @square(b)");
    assert_eq!(h.run(id, &[num(3.0), num(4.0)]), num(25.0));
}

#[test]
fn test_mutual_recursion_compiled_together() {
    let mut h = TestHarness::new();
    let even = h.add(
        "is_even",
        "boolean",
        &["number n"],
        "if n == 0\nreturn true\nelse\nreturn @is_odd(n - 1)\nend if",
    );
    h.add(
        "is_odd",
        "boolean",
        &["number n"],
        "if n == 0\nreturn false\nelse\nreturn @is_even(n - 1)\nend if",
    );
    assert!(h.engine.compile_all().is_empty());
    assert_eq!(h.run(even, &[num(10.0)]), NativeValue::Boolean(true));
    assert_eq!(h.run(even, &[num(7.0)]), NativeValue::Boolean(false));
}

#[test]
fn test_failing_callee_yields_null_to_caller() {
    let mut h = TestHarness::new();
    h.prog("boom", "number", &[], "return 1 / 0");
    let source = "\
var x as number = @boom()
if isnull(x)
  return -1
else
  return x
end if";
    let id = h.prog("careful", "number", &[], source);
    assert_eq!(h.run(id, &[]), num(-1.0));

    let faults = h.incidents_of(IncidentKind::Fault);
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].prog_name, "boom");
}

#[test]
fn test_send_and_now() {
    let mut h = TestHarness::new();
    let id = h.prog(
        "greet",
        "void",
        &["character who", "number n"],
        "send(who, \"visit \" + totext(n))\nreturn",
    );
    assert_eq!(h.run(id, &[character(7), num(3.0)]), NativeValue::Null);
    assert_eq!(
        h.host.sent,
        vec![(EntityRef::new(BaseType::Character, 7), "visit 3".to_string())]
    );
}

#[test]
fn test_typed_entry_rejects_mismatched_argument() {
    let mut h = TestHarness::new();
    let prog = h.build("echo", "number", &["number x"], "return x").accepting_any_parameters();
    let id = h.add_built(prog);
    h.engine.compile(id).unwrap();

    let fault = h.try_run(id, vec![Value::text("oops")]).unwrap_err();
    assert_eq!(
        fault,
        ExecutionFault::ArgumentType {
            parameter: "x".to_string(),
            expected: TypeDescriptor::NUMBER,
            found: TypeDescriptor::TEXT,
        }
    );
    assert_eq!(h.try_run(id, vec![Value::number(2.0), Value::text("extra")]), Ok(Value::number(2.0)));
}
