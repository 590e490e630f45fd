//! Test helpers for executor tests
//!
//! Build programs from `json!` trees and contexts with recording natives.

use anyhow::Result;
use serde_json::Value as JsonValue;
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::driver::{DryRunDriver, Driver, Proxy, Session};
use crate::interpreter::executor::{run, RunResult};
use crate::interpreter::{ExecError, ExecutionContext, Stmt, Value};

/// Parse a JSON instruction tree
pub fn program(json: JsonValue) -> Vec<Stmt> {
    serde_json::from_value(json).expect("Program parse failed")
}

/// Context with the default natives and a dry-run driver
pub fn context() -> ExecutionContext {
    ExecutionContext::builder().script_name("test").build()
}

pub fn run_program(ctx: &mut ExecutionContext, json: JsonValue) -> Result<RunResult, ExecError> {
    let program = program(json);
    run(ctx, &program)
}

/// Run a program that must complete, returning the context for inspection
pub fn run_ok(json: JsonValue) -> ExecutionContext {
    let mut ctx = context();
    let result = run_program(&mut ctx, json).expect("Run failed");
    assert_eq!(result, RunResult::Completed);
    ctx
}

pub type Calls = Rc<RefCell<Vec<Vec<Value>>>>;

/// Register a native that records the arguments of every call
pub fn recorder(ctx: &mut ExecutionContext, name: &str) -> Calls {
    recorder_returning(ctx, name, Value::Null)
}

/// Like `recorder`, returning a fixed value
pub fn recorder_returning(ctx: &mut ExecutionContext, name: &str, result: Value) -> Calls {
    let calls: Calls = Rc::default();
    let sink = calls.clone();
    ctx.natives.register(name, move |_, args| {
        sink.borrow_mut().push(args.to_vec());
        Ok(result.clone())
    });
    calls
}

pub fn var(ctx: &ExecutionContext, name: &str) -> Value {
    ctx.variable(name)
        .cloned()
        .unwrap_or_else(|| panic!("variable {} not set", name))
}

/// Dry-run driver that counts provisioned sessions
pub struct CountingDriver {
    inner: DryRunDriver,
    pub instances: Rc<Cell<usize>>,
}

impl CountingDriver {
    pub fn new(reports_dir: impl Into<PathBuf>) -> (Self, Rc<Cell<usize>>) {
        let instances = Rc::new(Cell::new(0));
        let driver = Self {
            inner: DryRunDriver::new(reports_dir),
            instances: instances.clone(),
        };
        (driver, instances)
    }
}

impl Driver for CountingDriver {
    fn instance_browser(
        &mut self,
        proxy_enabled: bool,
        proxy_path: &str,
        params: &[Value],
    ) -> Result<Session> {
        self.instances.set(self.instances.get() + 1);
        self.inner.instance_browser(proxy_enabled, proxy_path, params)
    }

    fn export_net_report(
        &mut self,
        proxy: &dyn Proxy,
        params: &[Value],
        script_name: &str,
    ) -> Result<PathBuf> {
        self.inner.export_net_report(proxy, params, script_name)
    }

    fn reset_har(
        &mut self,
        report_set: bool,
        artifact: Option<&Path>,
        current_url: &str,
        proxy: &mut dyn Proxy,
    ) -> Result<()> {
        self.inner.reset_har(report_set, artifact, current_url, proxy)
    }
}
