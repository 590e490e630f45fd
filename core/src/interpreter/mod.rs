pub mod context;
pub mod errors;
pub mod executor;
pub mod stdlib;
pub mod types;

pub use context::{ContextBuilder, ExecutionContext, ScriptInfo};
pub use errors::{ExecError, ExecResult, Halt, TreeError};
pub use executor::{run, RunResult};
pub use stdlib::{NativeFn, NativeRegistry};
pub use types::{parse_program, Block, Expr, LineSource, Stmt, Value};

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Load an instruction tree file produced by the parser
pub fn load_program(path: &Path) -> Result<Vec<Stmt>> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse_program(&source).with_context(|| format!("Failed to load script {}", path.display()))
}

/// Script name as reported in logs and report artifacts: the file stem
pub fn script_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "script".to_string())
}
