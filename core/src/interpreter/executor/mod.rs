//! # Instruction tree executor
//!
//! Recursive tree-walking interpreter over `Stmt`/`Expr`.
//!
//! - `statements`: dispatcher, routes each statement by variant
//! - `control_flow`: if/elif/else, counted loops, collection loops, while
//! - `expressions`: expression evaluation and operator semantics
//! - `calls`: function resolution (reserved names, natives, user procedures)
//!
//! Every function takes the one `ExecutionContext` by mutable reference.
//! Nested bodies recurse back into `execute`; there is no explicit depth limit.

pub mod calls;
pub mod control_flow;
pub mod expressions;
pub mod statements;

#[cfg(test)]
mod tests;

use tracing::{error, info};

use super::context::ExecutionContext;
use super::errors::{ExecError, Halt};
use super::types::Stmt;

pub use calls::{resolve, Resolution};
pub use expressions::evaluate;
pub use statements::{execute, execute_statement};

/// How a script run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunResult {
    /// Every top-level instruction ran
    Completed,
    /// The script called `exit`
    Exited(i32),
}

impl RunResult {
    pub fn exit_code(self) -> i32 {
        match self {
            RunResult::Completed => 0,
            RunResult::Exited(code) => code,
        }
    }
}

/// Run a whole program against the context
///
/// Fatal errors are logged here once with the script name and returned.
pub fn run(ctx: &mut ExecutionContext, program: &[Stmt]) -> Result<RunResult, ExecError> {
    match execute(ctx, program) {
        Ok(()) => Ok(RunResult::Completed),
        Err(Halt::Exit(code)) => {
            info!(script = %ctx.script.name, code, "script exited");
            Ok(RunResult::Exited(code))
        }
        Err(Halt::Error(e)) => {
            error!(script = %ctx.script.name, "script aborted: {}", e);
            Err(e)
        }
    }
}
