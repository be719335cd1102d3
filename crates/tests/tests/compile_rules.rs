//! Compile-time rejection and recompilation behaviour.

use prog_compiler::CompileError;
use prog_runtime::{IncidentKind, RuntimeError};
use prog_tests::{TestHarness, num};

fn compile_error(result: Result<prog_compiler::ProgId, RuntimeError>) -> CompileError {
    match result {
        Err(RuntimeError::Compile { error, .. }) => error,
        other => panic!("expected a compile error, got {:?}", other),
    }
}

#[test]
fn test_if_without_else_does_not_return_on_all_paths() {
    let mut h = TestHarness::new();
    let err = compile_error(h.try_prog(
        "half",
        "number",
        &["number x"],
        "if x > 0\nreturn x times 2\nend if",
    ));
    assert_eq!(err.line, 3);
    assert!(err.message.contains("not all code paths"));
}

#[test]
fn test_break_outside_loop() {
    let mut h = TestHarness::new();
    let err = compile_error(h.try_prog("stray", "void", &[], "// nothing yet\n\nbreak"));
    assert_eq!(err.line, 3);
    assert!(err.message.contains("outside of a loop"));
}

#[test]
fn test_continue_inside_if_outside_loop() {
    let mut h = TestHarness::new();
    let err = compile_error(h.try_prog("stray", "void", &[], "if true\ncontinue\nend if"));
    assert_eq!(err.line, 2);
}

#[test]
fn test_break_inside_loop_inside_if() {
    let mut h = TestHarness::new();
    let source = "var n as number = 0\nwhile n < 3\nif n == 1\nbreak\nend if\nn = n + 1\nend while\nreturn n";
    let id = h.prog("early", "number", &[], source);
    assert_eq!(h.run(id, &[]), num(1.0));
}

#[test]
fn test_block_local_variable_not_visible_after_block() {
    let mut h = TestHarness::new();
    let err = compile_error(h.try_prog(
        "leak",
        "number",
        &[],
        "if true\nvar inner as number = 1\nend if\nreturn inner",
    ));
    assert_eq!(err.line, 4);
    assert!(err.message.contains("unknown variable"));
}

#[test]
fn test_type_errors() {
    let mut h = TestHarness::new();
    let err = compile_error(h.try_prog("a", "void", &[], "var n as number = \"three\""));
    assert_eq!(err.line, 1);

    let err = compile_error(h.try_prog("b", "number", &[], "return \"three\""));
    assert_eq!(err.line, 1);

    let err = compile_error(h.try_prog("c", "number", &[], "return"));
    assert_eq!(err.line, 1);
}

#[test]
fn test_unknown_function_and_prog() {
    let mut h = TestHarness::new();
    let err = compile_error(h.try_prog("a", "number", &[], "return frobnicate(1)"));
    assert!(err.message.contains("frobnicate"));

    let err = compile_error(h.try_prog("b", "number", &[], "return @missing()"));
    assert!(err.message.contains("missing"));
}

#[test]
fn test_failed_compile_leaves_prog_uncompiled() {
    let mut h = TestHarness::new();
    let result = h.try_prog("broken", "number", &[], "return nonsense +");
    let id = h.engine.prog_by_name("broken").map(|p| p.id).unwrap();
    assert!(result.is_err());

    let prog = h.engine.prog(id).unwrap();
    assert!(!prog.is_compiled());
    assert!(prog.statements().is_none());
    assert!(prog.last_error().is_some());

    assert_eq!(h.run(id, &[]), prog_types::NativeValue::Null);
    assert_eq!(h.incidents_of(IncidentKind::NotCompiled).len(), 1);
}

#[test]
fn test_recompile_after_fixing_source() {
    let mut h = TestHarness::new();
    let id = h.prog("value", "number", &[], "return 1");
    assert_eq!(h.run(id, &[]), num(1.0));

    h.engine.set_source(id, "return 2").unwrap();
    h.engine.compile(id).unwrap();
    assert_eq!(h.run(id, &[]), num(2.0));

    // Compiling the same source twice gives the same program.
    h.engine.compile(id).unwrap();
    assert_eq!(h.run(id, &[]), num(2.0));
}

#[test]
fn test_comments_and_blank_lines_keep_line_numbers() {
    let mut h = TestHarness::new();
    let source = "// header\n\nvar n as number = 1\n\n// about to fail\nn = \"x\"";
    let err = compile_error(h.try_prog("lines", "void", &[], source));
    assert_eq!(err.line, 6);
}

/// `echo(number x)`, which also tolerates extra arguments.
fn lenient_echo(h: &mut TestHarness) {
    let prog = h.build("echo", "number", &["number x"], "return x").accepting_any_parameters();
    let id = h.add_built(prog);
    h.engine.compile(id).unwrap();
}

#[test]
fn test_lenient_prog_still_types_declared_parameters() {
    let mut h = TestHarness::new();
    lenient_echo(&mut h);
    let err = compile_error(h.try_prog("caller", "number", &[], "return @echo(\"oops\")"));
    assert_eq!(err.line, 1);
    assert!(err.message.contains("must be number"));
}

#[test]
fn test_lenient_prog_accepts_surplus_arguments() {
    let mut h = TestHarness::new();
    lenient_echo(&mut h);
    let id = h.prog("caller", "number", &[], "return @echo(5, \"extra\", true)");
    assert_eq!(h.run(id, &[]), num(5.0));
    assert!(h.incidents().is_empty());
}

#[test]
fn test_unclosed_else_reported_at_if() {
    let mut h = TestHarness::new();
    let source = "var n as number = 1\nif n > 0\n  n = 2\nelse\n  n = 3";
    let err = compile_error(h.try_prog("dangling", "void", &["number x"], source));
    assert_eq!(err.line, 2);
}

#[test]
fn test_for_counter_is_read_only() {
    let mut h = TestHarness::new();
    let source = "var total as number = 0\nfor i = 1 to 10\n  i = i + 5\n  total = total + 1\nend for";
    let err = compile_error(h.try_prog("skipper", "void", &[], source));
    assert_eq!(err.line, 3);
}
