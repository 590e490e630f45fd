//! Tests for if / elif / else

use super::helpers::{context, recorder, recorder_returning, run_ok, run_program, var};
use crate::interpreter::Value;
use serde_json::{json, Value as JsonValue};

fn mark(label: &str) -> JsonValue {
    json!([["assign", "ran", ["value", label]]])
}

#[test]
fn test_if_true_runs_then() {
    let ctx = run_ok(json!([
        ["if", ["value", true], mark("A"), [["else", mark("D")]]]
    ]));
    assert_eq!(var(&ctx, "ran"), Value::from("A"));
}

#[test]
fn test_first_truthy_elif_wins() {
    let ctx = run_ok(json!([
        ["if", ["value", false], mark("A"),
            [["elif", ["value", false], mark("B")], ["elif", ["value", true], mark("C")]],
            [["else", mark("D")]]]
    ]));
    assert_eq!(var(&ctx, "ran"), Value::from("C"));
}

#[test]
fn test_else_runs_when_no_elif_matches() {
    let ctx = run_ok(json!([
        ["if", ["value", false], mark("A"),
            [["elif", ["value", false], mark("B")]],
            [["else", mark("D")]]]
    ]));
    assert_eq!(var(&ctx, "ran"), Value::from("D"));
}

#[test]
fn test_else_only_form() {
    let ctx = run_ok(json!([
        ["if", ["value", 0], mark("A"), [["else", mark("D")]]]
    ]));
    assert_eq!(var(&ctx, "ran"), Value::from("D"));
}

#[test]
fn test_no_branch_runs_without_else() {
    let ctx = run_ok(json!([
        ["if", ["value", false], mark("A"), [["elif", ["value", ""], mark("B")]]],
        ["if", ["value", false], mark("A")]
    ]));
    assert!(ctx.variable("ran").is_none());
}

#[test]
fn test_elif_tests_short_circuit() {
    let mut ctx = context();
    let first = recorder_returning(&mut ctx, "first", Value::Bool(true));
    let second = recorder(&mut ctx, "second");

    run_program(
        &mut ctx,
        json!([
            ["if", ["value", false], [],
                [["elif", ["func", "first", []], mark("B")],
                 ["elif", ["func", "second", []], mark("C")]]]
        ]),
    )
    .unwrap();

    assert_eq!(first.borrow().len(), 1);
    assert!(second.borrow().is_empty());
    assert_eq!(var(&ctx, "ran"), Value::from("B"));
}

#[test]
fn test_condition_uses_truthiness() {
    let ctx = run_ok(json!([
        ["assign", "items", ["value", [1]]],
        ["if", ["var", "items"], mark("non-empty list")]
    ]));
    assert_eq!(var(&ctx, "ran"), Value::from("non-empty list"));
}
