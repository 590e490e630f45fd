//! Native operations available to scripts
//!
//! Natives are host functions keyed by name. They receive the browser
//! session and the already-evaluated arguments. `check_net` and
//! `get_parameter` are not in the table: the executor dispatches them
//! directly (see `net`).

pub mod browser;
pub mod host;
pub mod net;

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::fmt;

use crate::driver::Session;
use crate::interpreter::types::Value;

/// A native operation. Returns `Value::Null` when it has nothing to return.
pub type NativeFn = Box<dyn Fn(&mut Session, &[Value]) -> Result<Value>>;

/// Registry of native operations
#[derive(Default)]
pub struct NativeRegistry {
    functions: HashMap<String, NativeFn>,
}

impl NativeRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the browser and host natives installed
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        browser::register(&mut registry);
        host::register(&mut registry);
        registry
    }

    /// Register a native, replacing any existing one with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&mut Session, &[Value]) -> Result<Value> + 'static,
    {
        self.functions.insert(name.into(), Box::new(func));
    }

    pub fn get(&self, name: &str) -> Option<&NativeFn> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

impl fmt::Debug for NativeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("NativeRegistry").field("functions", &names).finish()
    }
}

/* ===================== Argument Helpers ===================== */

pub(crate) fn arg<'a>(args: &'a [Value], index: usize, func: &str) -> Result<&'a Value> {
    args.get(index)
        .ok_or_else(|| anyhow!("{}() requires at least {} argument(s)", func, index + 1))
}

/// Argument in its string form; numbers are accepted where text is expected
pub(crate) fn text_arg(args: &[Value], index: usize, func: &str) -> Result<String> {
    Ok(arg(args, index, func)?.to_string())
}

pub(crate) fn number_arg(args: &[Value], index: usize, func: &str) -> Result<f64> {
    let value = arg(args, index, func)?;
    value
        .as_f64()
        .ok_or_else(|| anyhow!("{}() argument {} must be a number, got {}", func, index + 1, value.kind()))
}

pub(crate) fn int_arg(args: &[Value], index: usize, func: &str) -> Result<i64> {
    let value = arg(args, index, func)?;
    value
        .as_int()
        .ok_or_else(|| anyhow!("{}() argument {} must be an integer, got {}", func, index + 1, value.kind()))
}
