//! Expression evaluation
//!
//! Operators are a closed set dispatched by direct case analysis on the
//! operand kinds at runtime.

use std::cmp::Ordering;

use tracing::error;

use super::calls::call_expression;
use crate::interpreter::context::ExecutionContext;
use crate::interpreter::errors::{ExecError, ExecResult};
use crate::interpreter::types::{ArithOp, BoolOp, Expr, Value};

/// Evaluate an expression to a value
pub fn evaluate(ctx: &mut ExecutionContext, expr: &Expr) -> ExecResult<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),

        Expr::Var(name) => match ctx.variable(name) {
            Some(value) => Ok(value.clone()),
            None => {
                error!("variable '{}' not defined", name);
                Err(ExecError::UndefinedVariable(name.clone()).into())
            }
        },

        Expr::Arith { op, lhs, rhs } => {
            let lhs = evaluate(ctx, lhs)?;
            let rhs = evaluate(ctx, rhs)?;
            Ok(arithmetic(*op, &lhs, &rhs)?)
        }

        Expr::Boolean { op, lhs, rhs } => {
            let lhs = evaluate(ctx, lhs)?;
            let rhs = evaluate(ctx, rhs)?;
            Ok(boolean(*op, &lhs, &rhs)?)
        }

        Expr::Not(operand) => Ok(Value::Bool(!evaluate(ctx, operand)?.is_truthy())),

        Expr::Call { name, args } => call_expression(ctx, name, args),
    }
}

/* ===================== Arithmetic ===================== */

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(Number::Int(*n)),
            Value::Bool(b) => Some(Number::Int(*b as i64)),
            Value::Float(x) => Some(Number::Float(*x)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(x) => x,
        }
    }
}

/// Apply an arithmetic operator
///
/// `+` with a text operand concatenates string forms; `+` on two lists
/// concatenates them. Everything else is numeric.
pub fn arithmetic(op: ArithOp, lhs: &Value, rhs: &Value) -> Result<Value, ExecError> {
    if op == ArithOp::Add {
        if lhs.is_text() || rhs.is_text() {
            return Ok(Value::Text(format!("{}{}", lhs, rhs)));
        }
        if let (Value::List(a), Value::List(b)) = (lhs, rhs) {
            return Ok(Value::List(a.iter().chain(b).cloned().collect()));
        }
    }

    match (Number::of(lhs), Number::of(rhs)) {
        (Some(Number::Int(a)), Some(Number::Int(b))) => int_arithmetic(op, a, b),
        (Some(a), Some(b)) => float_arithmetic(op, a.as_f64(), b.as_f64()),
        _ => Err(ExecError::TypeMismatch {
            op: op.symbol(),
            lhs: lhs.kind(),
            rhs: rhs.kind(),
        }),
    }
}

fn int_arithmetic(op: ArithOp, a: i64, b: i64) -> Result<Value, ExecError> {
    let overflow = || ExecError::Overflow(op.symbol());

    let n = match op {
        ArithOp::Add => a.checked_add(b).ok_or_else(overflow)?,
        ArithOp::Sub => a.checked_sub(b).ok_or_else(overflow)?,
        ArithOp::Mul => a.checked_mul(b).ok_or_else(overflow)?,
        ArithOp::Div => {
            if b == 0 {
                return Err(ExecError::DivisionByZero);
            }
            return Ok(Value::Float(a as f64 / b as f64));
        }
        ArithOp::FloorDiv => {
            if b == 0 {
                return Err(ExecError::DivisionByZero);
            }
            let q = a.checked_div(b).ok_or_else(overflow)?;
            // round toward negative infinity
            if a % b != 0 && ((a < 0) != (b < 0)) {
                q - 1
            } else {
                q
            }
        }
        ArithOp::Mod => {
            if b == 0 {
                return Err(ExecError::DivisionByZero);
            }
            // result takes the sign of the divisor
            let r = a.checked_rem(b).ok_or_else(overflow)?;
            if r != 0 && ((r < 0) != (b < 0)) {
                r + b
            } else {
                r
            }
        }
        ArithOp::Pow => match u32::try_from(b) {
            Ok(exp) => a.checked_pow(exp).ok_or_else(overflow)?,
            Err(_) if b < 0 => return Ok(Value::Float((a as f64).powf(b as f64))),
            Err(_) => return Err(overflow()),
        },
    };

    Ok(Value::Int(n))
}

fn float_arithmetic(op: ArithOp, a: f64, b: f64) -> Result<Value, ExecError> {
    let x = match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div | ArithOp::FloorDiv | ArithOp::Mod if b == 0.0 => {
            return Err(ExecError::DivisionByZero)
        }
        ArithOp::Div => a / b,
        ArithOp::FloorDiv => (a / b).floor(),
        ArithOp::Mod => {
            let r = a % b;
            if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
                r + b
            } else {
                r
            }
        }
        ArithOp::Pow => a.powf(b),
    };

    Ok(Value::Float(x))
}

/* ===================== Boolean ===================== */

/// Apply a comparison or logical operator
///
/// Text operands compare as text. `and`/`or` yield the operand that decides
/// the result: `"" or "guest"` is `"guest"`, `0 and x` is `0`.
pub fn boolean(op: BoolOp, lhs: &Value, rhs: &Value) -> Result<Value, ExecError> {
    let result = match op {
        BoolOp::And if lhs.is_truthy() => return Ok(rhs.clone()),
        BoolOp::Or if !lhs.is_truthy() => return Ok(rhs.clone()),
        BoolOp::And | BoolOp::Or => return Ok(lhs.clone()),
        BoolOp::Eq => values_equal(lhs, rhs),
        BoolOp::Ne => !values_equal(lhs, rhs),
        BoolOp::Lt | BoolOp::Gt | BoolOp::Le | BoolOp::Ge => {
            let ordering = compare(lhs, rhs).ok_or(ExecError::TypeMismatch {
                op: op.symbol(),
                lhs: lhs.kind(),
                rhs: rhs.kind(),
            })?;
            match (op, ordering) {
                // NaN compares false against everything
                (_, None) => false,
                (BoolOp::Lt, Some(o)) => o == Ordering::Less,
                (BoolOp::Gt, Some(o)) => o == Ordering::Greater,
                (BoolOp::Le, Some(o)) => o != Ordering::Greater,
                (_, Some(o)) => o != Ordering::Less,
            }
        }
    };

    Ok(Value::Bool(result))
}

/// Equality across kinds: numbers numerically, everything else structurally.
/// Different kinds are never equal.
pub fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        _ => match (Number::of(lhs), Number::of(rhs)) {
            (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
            _ => lhs == rhs,
        },
    }
}

/// Ordering for comparable kinds
///
/// Outer `None`: the kinds cannot be ordered. Inner `None`: unordered
/// numbers (NaN).
fn compare(lhs: &Value, rhs: &Value) -> Option<Option<Ordering>> {
    match (lhs, rhs) {
        (Value::Text(a), Value::Text(b)) => Some(Some(a.cmp(b))),
        (Value::Int(a), Value::Int(b)) => Some(Some(a.cmp(b))),
        _ => match (Number::of(lhs), Number::of(rhs)) {
            (Some(a), Some(b)) => Some(a.as_f64().partial_cmp(&b.as_f64())),
            _ => None,
        },
    }
}
