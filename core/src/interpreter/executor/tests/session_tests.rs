//! Tests for the session lifecycle: browser, reset_har, export_net_report,
//! check_net

use super::helpers::{context, run_program, var, CountingDriver};
use crate::driver::{DryRunDriver, Driver, Proxy, Session};
use crate::interpreter::executor::RunResult;
use crate::interpreter::{ExecError, ExecutionContext, Value};
use anyhow::{bail, Result};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn proxied_context(dir: &TempDir) -> ExecutionContext {
    ExecutionContext::builder()
        .script_name("checkout")
        .proxy(true, "bmp")
        .driver(DryRunDriver::new(dir.path()))
        .build()
}

struct FailingDriver;

impl Driver for FailingDriver {
    fn instance_browser(&mut self, _: bool, _: &str, _: &[Value]) -> Result<Session> {
        bail!("chromedriver not found")
    }

    fn export_net_report(&mut self, _: &dyn Proxy, _: &[Value], _: &str) -> Result<PathBuf> {
        bail!("no proxy")
    }

    fn reset_har(&mut self, _: bool, _: Option<&Path>, _: &str, _: &mut dyn Proxy) -> Result<()> {
        bail!("no proxy")
    }
}

#[test]
fn test_browser_is_provisioned_once() {
    let dir = tempfile::tempdir().unwrap();
    let (driver, instances) = CountingDriver::new(dir.path());
    let mut ctx = ExecutionContext::builder().driver(driver).build();

    run_program(
        &mut ctx,
        json!([
            ["func", "browser", [["value", "chrome"]]],
            ["func", "go_to", [["value", "https://shop.test/cart"]]],
            ["func", "browser", [["value", "chrome"]]],
            ["assign", "url", ["func", "get_url", []]]
        ]),
    )
    .unwrap();

    assert_eq!(instances.get(), 1);
    assert_eq!(var(&ctx, "url"), Value::from("https://shop.test/cart"));
}

#[test]
fn test_close_browser_allows_new_session() {
    let dir = tempfile::tempdir().unwrap();
    let (driver, instances) = CountingDriver::new(dir.path());
    let mut ctx = ExecutionContext::builder().driver(driver).build();

    run_program(
        &mut ctx,
        json!([
            ["func", "browser", []],
            ["func", "go_to", [["value", "https://a.test"]]],
            ["func", "close_browser", []],
            ["func", "browser", []],
            ["assign", "url", ["func", "get_url", []]]
        ]),
    )
    .unwrap();

    assert_eq!(instances.get(), 2);
    assert_eq!(var(&ctx, "url"), Value::from("about:blank"));
}

#[test]
fn test_browser_failure_is_fatal() {
    let mut ctx = ExecutionContext::builder().driver(FailingDriver).build();
    let result = run_program(
        &mut ctx,
        json!([
            ["func", "browser", []],
            ["assign", "after", ["value", 1]]
        ]),
    );

    match result {
        Err(ExecError::Session(e)) => assert!(e.to_string().contains("chromedriver")),
        other => panic!("Expected Session, got {:?}", other),
    }
    assert!(ctx.variable("after").is_none());
}

#[test]
fn test_export_without_proxy_is_noop() {
    let mut ctx = context();
    let result = run_program(
        &mut ctx,
        json!([
            ["func", "browser", []],
            ["func", "export_net_report", []],
            ["func", "reset_har", []]
        ]),
    )
    .unwrap();

    assert_eq!(result, RunResult::Completed);
    assert!(!ctx.net_report_set);
    assert!(ctx.net_report.is_none());
}

#[test]
fn test_export_with_proxy_sets_report() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = proxied_context(&dir);

    run_program(
        &mut ctx,
        json!([
            ["func", "browser", []],
            ["func", "go_to", [["value", "https://shop.test/"]]],
            ["func", "export_net_report", []]
        ]),
    )
    .unwrap();

    assert!(ctx.net_report_set);
    let report = ctx.net_report.clone().unwrap();
    assert!(report.starts_with(dir.path()));
    assert!(report
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("checkout_"));

    let contents = fs::read_to_string(&report).unwrap();
    assert_eq!(contents, "url,method,status\nhttps://shop.test/,GET,200\n");
}

#[test]
fn test_export_report_name_override() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = proxied_context(&dir);

    run_program(
        &mut ctx,
        json!([
            ["func", "browser", []],
            ["func", "export_net_report", [["value", "nightly"]]]
        ]),
    )
    .unwrap();

    let report = ctx.net_report.clone().unwrap();
    assert!(report
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("nightly_"));
}

#[test]
fn test_reset_har_flushes_into_report() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = proxied_context(&dir);

    run_program(
        &mut ctx,
        json!([
            ["func", "browser", []],
            ["func", "export_net_report", []],
            ["func", "go_to", [["value", "https://shop.test/step1"]]],
            ["func", "reset_har", []],
            ["func", "go_to", [["value", "https://shop.test/step2"]]],
            ["func", "reset_har", []]
        ]),
    )
    .unwrap();

    let report = ctx.net_report.clone().unwrap();
    let contents = fs::read_to_string(report).unwrap();
    assert_eq!(
        contents,
        "url,method,status\n\
         https://shop.test/step1,GET,200\n\
         https://shop.test/step2,GET,200\n"
    );
}

#[test]
fn test_reset_har_without_report_only_clears_capture() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = proxied_context(&dir);

    run_program(
        &mut ctx,
        json!([
            ["func", "browser", []],
            ["func", "go_to", [["value", "https://shop.test/"]]],
            ["func", "reset_har", []],
            ["assign", "status", ["func", "check_net", [["value", "shop.test"]]]]
        ]),
    )
    .unwrap();

    assert!(!ctx.net_report_set);
    assert_eq!(var(&ctx, "status"), Value::Bool(false));
    assert_eq!(fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0), 0);
}

#[test]
fn test_reset_har_before_browser_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = proxied_context(&dir);
    let result = run_program(&mut ctx, json!([["func", "reset_har", []]]));
    assert!(matches!(result, Err(ExecError::NoBrowser)));
}

#[test]
fn test_check_net_reads_capture() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = proxied_context(&dir);

    run_program(
        &mut ctx,
        json!([
            ["func", "browser", []],
            ["func", "go_to", [["value", "https://shop.test/api/cart"]]],
            ["assign", "hit", ["func", "check_net", [["value", "api/cart"]]]],
            ["assign", "miss", ["func", "check_net", [["value", "api/pay"]]]]
        ]),
    )
    .unwrap();

    assert_eq!(var(&ctx, "hit"), Value::Int(200));
    assert_eq!(var(&ctx, "miss"), Value::Bool(false));
}

#[test]
fn test_check_net_without_proxy_is_fatal() {
    let mut ctx = context();
    let result = run_program(
        &mut ctx,
        json!([
            ["func", "browser", []],
            ["assign", "x", ["func", "check_net", [["value", "api"]]]]
        ]),
    );
    assert!(matches!(result, Err(ExecError::NoProxy)));
}
