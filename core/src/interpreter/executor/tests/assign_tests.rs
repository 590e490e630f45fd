//! Tests for Assign and Define statements

use super::helpers::{context, recorder, run_ok, run_program, var};
use crate::interpreter::{ExecError, Value};
use maplit::hashmap;
use serde_json::json;

#[test]
fn test_assign_then_read() {
    let ctx = run_ok(json!([
        ["assign", "x", ["value", 42]],
        ["assign", "y", ["var", "x"]]
    ]));

    assert_eq!(
        ctx.variables,
        hashmap! {
            "x".to_string() => Value::Int(42),
            "y".to_string() => Value::Int(42),
        }
    );
}

#[test]
fn test_assign_overwrites() {
    let ctx = run_ok(json!([
        ["assign", "x", ["value", 1]],
        ["assign", "x", ["value", "now text"]]
    ]));

    assert_eq!(var(&ctx, "x"), Value::from("now text"));
}

#[test]
fn test_statements_run_in_source_order() {
    let mut ctx = context();
    let log = recorder(&mut ctx, "log");

    run_program(
        &mut ctx,
        json!([
            ["func", "log", [["value", 1]]],
            ["assign", "x", ["value", 2]],
            ["func", "log", [["var", "x"]]],
            ["func", "log", [["value", 3]]]
        ]),
    )
    .unwrap();

    assert_eq!(
        *log.borrow(),
        vec![vec![Value::Int(1)], vec![Value::Int(2)], vec![Value::Int(3)]]
    );
}

#[test]
fn test_undefined_variable_is_fatal() {
    let mut ctx = context();
    let log = recorder(&mut ctx, "log");

    let result = run_program(
        &mut ctx,
        json!([
            ["assign", "y", ["var", "missing"]],
            ["func", "log", []]
        ]),
    );

    match result {
        Err(ExecError::UndefinedVariable(name)) => assert_eq!(name, "missing"),
        other => unreachable!("Expected UndefinedVariable, got {:?}", other),
    }
    assert!(log.borrow().is_empty());
}

#[test]
fn test_define_does_not_run_body() {
    let mut ctx = context();
    let log = recorder(&mut ctx, "log");

    run_program(&mut ctx, json!([["def", "proc", [["func", "log", []]]]])).unwrap();

    assert!(log.borrow().is_empty());
    assert!(ctx.procedures.contains_key("proc"));
}

#[test]
fn test_redefine_replaces_body() {
    let ctx = run_ok(json!([
        ["def", "set", [["assign", "x", ["value", "first"]]]],
        ["def", "set", [["assign", "x", ["value", "second"]]]],
        ["func", "set", []]
    ]));

    assert_eq!(var(&ctx, "x"), Value::from("second"));
}

#[test]
fn test_procedures_share_the_variable_namespace() {
    // the procedure reads the caller's `n` and its writes stay visible afterwards
    let ctx = run_ok(json!([
        ["assign", "n", ["value", 10]],
        ["def", "double", [
            ["assign", "n", ["arithm", ["var", "n"], ["value", 2], "*"]],
            ["assign", "touched", ["value", true]]
        ]],
        ["func", "double", []],
        ["func", "double", []]
    ]));

    assert_eq!(var(&ctx, "n"), Value::Int(40));
    assert_eq!(var(&ctx, "touched"), Value::Bool(true));
}

#[test]
fn test_procedure_can_redefine_itself_while_running() {
    let ctx = run_ok(json!([
        ["assign", "calls", ["value", 0]],
        ["def", "once", [
            ["assign", "calls", ["arithm", ["var", "calls"], ["value", 1], "+"]],
            ["def", "once", []]
        ]],
        ["func", "once", []],
        ["func", "once", []]
    ]));

    assert_eq!(var(&ctx, "calls"), Value::Int(1));
}
