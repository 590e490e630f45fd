pub mod cli;
pub mod config;
pub mod driver;
pub mod interpreter;

// Re-export main types
pub use config::Config;
pub use driver::{Driver, DryRunDriver, Session};
pub use interpreter::{
    load_program, parse_program, run, ExecError, ExecutionContext, NativeRegistry, RunResult,
    Stmt, Value,
};
