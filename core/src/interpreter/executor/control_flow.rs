//! Control-flow statements

use super::expressions::evaluate;
use super::statements::execute;
use crate::interpreter::context::ExecutionContext;
use crate::interpreter::errors::{ExecError, ExecResult};
use crate::interpreter::types::{ElifClause, Expr, StepMode, Stmt, Value};

/// if / elif / else. At most one branch runs; elif tests are evaluated in
/// order only until one is truthy.
pub fn exec_if(
    ctx: &mut ExecutionContext,
    test: &Expr,
    then_body: &[Stmt],
    elifs: &[ElifClause],
    else_body: Option<&[Stmt]>,
) -> ExecResult<()> {
    if evaluate(ctx, test)?.is_truthy() {
        return execute(ctx, then_body);
    }

    for clause in elifs {
        if evaluate(ctx, &clause.test)?.is_truthy() {
            return execute(ctx, &clause.body);
        }
    }

    match else_body {
        Some(body) => execute(ctx, body),
        None => Ok(()),
    }
}

/// Counted loop over `[start, end)` advancing by the mode's step
///
/// The index is not visible to the body.
pub fn exec_for_range(
    ctx: &mut ExecutionContext,
    start: &Expr,
    end: &Expr,
    mode: StepMode,
    body: &[Stmt],
) -> ExecResult<()> {
    let start = range_bound(evaluate(ctx, start)?)?;
    let end = range_bound(evaluate(ctx, end)?)?;
    let step = mode.step();

    let mut index = start;
    while (step > 0 && index < end) || (step < 0 && index > end) {
        execute(ctx, body)?;
        match index.checked_add(step) {
            Some(next) => index = next,
            None => break,
        }
    }

    Ok(())
}

fn range_bound(value: Value) -> Result<i64, ExecError> {
    match value {
        Value::Int(n) => Ok(n),
        Value::Bool(b) => Ok(b as i64),
        other => Err(ExecError::InvalidRange(other.kind())),
    }
}

/// Collection loop binding each element to `var`
///
/// The binding stays in the context after the loop. Elements read from a
/// line source lose one trailing `\n`; everything else binds verbatim.
pub fn exec_for_each(
    ctx: &mut ExecutionContext,
    var: &str,
    iterable: &Expr,
    body: &[Stmt],
) -> ExecResult<()> {
    match evaluate(ctx, iterable)? {
        Value::List(items) => {
            for item in items {
                ctx.set_variable(var, item);
                execute(ctx, body)?;
            }
        }

        Value::Text(text) => {
            for ch in text.chars() {
                ctx.set_variable(var, Value::Text(ch.to_string()));
                execute(ctx, body)?;
            }
        }

        Value::Lines(source) => {
            while let Some(mut line) = source.next_line()? {
                if line.ends_with('\n') {
                    line.pop();
                }
                ctx.set_variable(var, Value::Text(line));
                execute(ctx, body)?;
            }
        }

        other => return Err(ExecError::NotIterable(other.kind()).into()),
    }

    Ok(())
}

/// Pre-test loop. No iteration cap.
pub fn exec_while(ctx: &mut ExecutionContext, test: &Expr, body: &[Stmt]) -> ExecResult<()> {
    while evaluate(ctx, test)?.is_truthy() {
        execute(ctx, body)?;
    }
    Ok(())
}
