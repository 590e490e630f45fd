//! Function resolution
//!
//! Two call sites share one protocol:
//! - statement form (`Stmt::Call`): return value discarded; session
//!   lifecycle names are intercepted first
//! - expression form (`Expr::Call`): `check_net` and `get_parameter` go to
//!   their fixed host functions
//!
//! Everything else resolves natives first, then user procedures.

use std::collections::HashMap;

use tracing::{debug, error, info};

use super::expressions::evaluate;
use super::statements::execute;
use crate::interpreter::context::ExecutionContext;
use crate::interpreter::errors::{ExecError, ExecResult, Halt};
use crate::interpreter::stdlib::{net, NativeFn, NativeRegistry};
use crate::interpreter::types::{Block, Expr, Value};

/// Outcome of looking a callable name up
pub enum Resolution<'a> {
    Native(&'a NativeFn),
    User(Block),
    NotFound,
}

/// Resolve a name: natives shadow user procedures of the same name
pub fn resolve<'a>(
    natives: &'a NativeRegistry,
    procedures: &HashMap<String, Block>,
    name: &str,
) -> Resolution<'a> {
    if let Some(native) = natives.get(name) {
        Resolution::Native(native)
    } else if let Some(body) = procedures.get(name) {
        Resolution::User(body.clone())
    } else {
        Resolution::NotFound
    }
}

/// Evaluate arguments left to right
fn evaluate_args(ctx: &mut ExecutionContext, args: &[Expr]) -> ExecResult<Vec<Value>> {
    args.iter().map(|arg| evaluate(ctx, arg)).collect()
}

/// Statement-form call
pub fn call_statement(ctx: &mut ExecutionContext, name: &str, args: &[Expr]) -> ExecResult<()> {
    let params = evaluate_args(ctx, args)?;

    match name {
        "exit" => Err(Halt::Exit(exit_code(&params))),
        "browser" => instance_browser(ctx, &params),
        "export_net_report" => export_net_report(ctx, &params),
        "reset_har" => reset_har(ctx),
        // only meaningful as expressions
        "check_net" | "get_parameter" => Ok(()),
        _ => invoke(ctx, name, &params).map(|_| ()),
    }
}

/// Expression-form call
pub fn call_expression(ctx: &mut ExecutionContext, name: &str, args: &[Expr]) -> ExecResult<Value> {
    let params = evaluate_args(ctx, args)?;

    match name {
        "check_net" => {
            let proxy = ctx.session.proxy.as_ref().ok_or(ExecError::NoProxy)?;
            net::check_net(&proxy.har(), &params).map_err(|e| native_failure(name, e))
        }
        "get_parameter" => net::get_parameter(&ctx.script.parameters, &params)
            .map_err(|e| native_failure(name, e)),
        _ => invoke(ctx, name, &params),
    }
}

/// General protocol: native, then user procedure, then "not defined"
///
/// A user procedure produces no value; expression-form callers get `Null`.
fn invoke(ctx: &mut ExecutionContext, name: &str, params: &[Value]) -> ExecResult<Value> {
    let body = match resolve(&ctx.natives, &ctx.procedures, name) {
        Resolution::Native(native) => {
            debug!(function = name, "calling native");
            return native(&mut ctx.session, params).map_err(|e| native_failure(name, e));
        }
        Resolution::User(body) => body,
        Resolution::NotFound => {
            error!("{} function not defined", name);
            return Err(ExecError::FunctionNotDefined(name.to_string()).into());
        }
    };

    debug!(function = name, "calling procedure");
    execute(ctx, &body)?;
    Ok(Value::Null)
}

fn native_failure(name: &str, source: anyhow::Error) -> Halt {
    error!("error with function {}: {:#}", name, source);
    ExecError::Native {
        name: name.to_string(),
        source,
    }
    .into()
}

/* ===================== Reserved Operations ===================== */

fn exit_code(params: &[Value]) -> i32 {
    match params.first() {
        None | Some(Value::Null) => 0,
        Some(Value::Int(code)) => i32::try_from(*code).unwrap_or(1),
        Some(Value::Bool(flag)) => i32::from(*flag),
        Some(other) => {
            error!("{}", other);
            1
        }
    }
}

fn instance_browser(ctx: &mut ExecutionContext, params: &[Value]) -> ExecResult<()> {
    if ctx.session.is_active() {
        error!("browser already instanced");
        return Ok(());
    }

    match ctx
        .driver
        .instance_browser(ctx.proxy_enabled, &ctx.proxy_path, params)
    {
        Ok(session) => {
            info!(proxy = ctx.proxy_enabled, "browser instanced");
            ctx.session = session;
            Ok(())
        }
        Err(e) => {
            error!("error with browser: {:#}", e);
            Err(ExecError::Session(e).into())
        }
    }
}

fn export_net_report(ctx: &mut ExecutionContext, params: &[Value]) -> ExecResult<()> {
    if !ctx.proxy_enabled {
        error!("can't get net report, proxy not enabled");
        return Ok(());
    }

    let proxy = ctx.session.proxy.as_deref().ok_or(ExecError::NoProxy)?;
    let artifact = ctx
        .driver
        .export_net_report(proxy, params, &ctx.script.name)
        .map_err(|e| native_failure("export_net_report", e))?;

    ctx.net_report = Some(artifact);
    ctx.net_report_set = true;
    Ok(())
}

fn reset_har(ctx: &mut ExecutionContext) -> ExecResult<()> {
    if !ctx.proxy_enabled {
        error!("can't reset HAR, proxy not enabled");
        return Ok(());
    }

    let current_url = ctx
        .session
        .browser
        .as_ref()
        .ok_or(ExecError::NoBrowser)?
        .current_url();
    let proxy = ctx.session.proxy.as_deref_mut().ok_or(ExecError::NoProxy)?;

    ctx.driver
        .reset_har(
            ctx.net_report_set,
            ctx.net_report.as_deref(),
            &current_url,
            proxy,
        )
        .map_err(|e| native_failure("reset_har", e))
}
