mod common;

use common::{runtime_error, stdout_of};
use loxide::interpreter::RuntimeError;

#[test]
fn if_runs_the_taken_branch_only() {
    assert_eq!(stdout_of("if (true) print \"bar\";"), "bar\n");
    assert_eq!(stdout_of("if (false) print \"bar\";"), "");
    assert_eq!(stdout_of("if (true) { print \"block body\"; }"), "block body\n");
}

#[test]
fn if_condition_uses_truthiness() {
    assert_eq!(stdout_of("if (0) print \"zero is truthy\";"), "zero is truthy\n");
    assert_eq!(stdout_of("if (\"\") print \"empty is truthy\";"), "empty is truthy\n");
    assert_eq!(stdout_of("if (nil) print \"no\";"), "");
}

#[test]
fn else_branch_runs_on_falsehood() {
    assert_eq!(
        stdout_of("if (true) print \"if branch\"; else print \"else branch\";"),
        "if branch\n"
    );
    assert_eq!(
        stdout_of("if (false) { print \"if block\"; } else print \"else statement\";"),
        "else statement\n"
    );
}

#[test]
fn else_if_chains() {
    let source = "\
var age = 88;
var stage = \"unknown\";
if (age < 18) { stage = \"child\"; }
else if (age >= 18) { stage = \"adult\"; }
else if (age >= 65) { stage = \"senior\"; }
print stage;
";
    assert_eq!(stdout_of(source), "adult\n");
}

#[test]
fn assignment_inside_a_condition_is_an_expression() {
    assert_eq!(
        stdout_of("var a = false; if (a = true) { print (a == true); }"),
        "true\n"
    );
}

#[test]
fn block_scopes_nest_and_restore() {
    let source = "\
{
  var hello = \"before\";
  {
    var hello = \"after\";
    print hello;
  }
  print hello;
}
";
    assert_eq!(stdout_of(source), "after\nbefore\n");
}

#[test]
fn while_runs_until_the_condition_fails() {
    assert_eq!(
        stdout_of("var baz = 0; while (baz < 3) print baz = baz + 1;"),
        "1\n2\n3\n"
    );
    assert_eq!(stdout_of("while (false) print \"never\";"), "");
}

#[test]
fn for_with_a_full_header() {
    assert_eq!(
        stdout_of("for (var baz = 0; baz < 3; baz = baz + 1) print baz;"),
        "0\n1\n2\n"
    );
}

#[test]
fn for_without_a_step() {
    assert_eq!(
        stdout_of("for (var baz = 0; baz < 3;) print baz = baz + 1;"),
        "1\n2\n3\n"
    );
}

#[test]
fn for_init_may_reuse_an_outer_variable() {
    assert_eq!(
        stdout_of("var i = 10; for (i = 0; i < 2; i = i + 1) print i; print i;"),
        "0\n1\n2\n"
    );
}

#[test]
fn for_header_variables_stay_inside_the_loop() {
    assert_eq!(
        runtime_error("for (var i = 0; i < 1; i = i + 1) print i; print i;"),
        RuntimeError::undefined_variable("i")
    );
}

#[test]
fn nested_loops_keep_separate_counters() {
    let source = "\
for (var i = 0; i < 2; i = i + 1) {
  for (var j = 0; j < 2; j = j + 1) {
    print i * 10 + j;
  }
}
";
    assert_eq!(stdout_of(source), "0\n1\n10\n11\n");
}

#[test]
fn condition_errors_stop_the_loop() {
    let (out, result) = common::run_program("var i = 0; while (i + \"\") print i;");
    assert_eq!(out, "");
    assert_eq!(result, Err(RuntimeError::OperandsMustBeNumbers));
}
