//! Type definitions for the executor
//!
//! - AST nodes (Stmt, Expr) and their wire-format loading
//! - Runtime values (Value, LineSource)

pub mod ast;
pub mod values;

pub use ast::{parse_program, ArithOp, Block, BoolOp, ElifClause, Expr, StepMode, Stmt};
pub use values::{LineSource, Value};
