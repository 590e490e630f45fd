use tracing::trace;

use super::calls::call_statement;
use super::control_flow::{exec_for_each, exec_for_range, exec_if, exec_while};
use super::expressions::evaluate;
use crate::interpreter::context::ExecutionContext;
use crate::interpreter::errors::ExecResult;
use crate::interpreter::types::Stmt;

/// Execute a sequence of statements in order
///
/// Stops at the first error or `exit`.
pub fn execute(ctx: &mut ExecutionContext, block: &[Stmt]) -> ExecResult<()> {
    for stmt in block {
        execute_statement(ctx, stmt)?;
    }
    Ok(())
}

/// Execute a single statement
pub fn execute_statement(ctx: &mut ExecutionContext, stmt: &Stmt) -> ExecResult<()> {
    match stmt {
        Stmt::Assign { name, expr } => {
            let value = evaluate(ctx, expr)?;
            trace!(name = %name, value = %value, "assign");
            ctx.set_variable(name.as_str(), value);
            Ok(())
        }

        Stmt::Define { name, body } => {
            trace!(name = %name, "define");
            ctx.define_procedure(name.as_str(), body.clone());
            Ok(())
        }

        Stmt::Call { name, args } => call_statement(ctx, name, args),

        Stmt::If {
            test,
            then_body,
            elifs,
            else_body,
        } => exec_if(ctx, test, then_body, elifs, else_body.as_deref()),

        Stmt::ForRange {
            start,
            end,
            step,
            body,
        } => exec_for_range(ctx, start, end, *step, body),

        Stmt::ForEach {
            var,
            iterable,
            body,
        } => exec_for_each(ctx, var, iterable, body),

        Stmt::While { test, body } => exec_while(ctx, test, body),
    }
}
