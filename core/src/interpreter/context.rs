//! The single mutable store shared by everything that runs a script

use std::collections::HashMap;
use std::path::PathBuf;

use super::stdlib::NativeRegistry;
use super::types::{Block, Value};
use crate::config::Config;
use crate::driver::{DryRunDriver, Driver, Session};

/// Script metadata
#[derive(Debug, Clone, Default)]
pub struct ScriptInfo {
    pub name: String,
    pub parameters: Vec<String>,
}

/// Execution context for one script run
///
/// Variables and procedures live in one flat namespace each; the last write
/// wins. User procedures run against this same context, so they read and
/// write the caller's variables.
pub struct ExecutionContext {
    pub variables: HashMap<String, Value>,
    pub procedures: HashMap<String, Block>,
    pub natives: NativeRegistry,
    pub session: Session,
    pub driver: Box<dyn Driver>,
    pub proxy_enabled: bool,
    pub proxy_path: String,
    /// Whether a network report was exported during this session
    pub net_report_set: bool,
    /// Location of the last exported report
    pub net_report: Option<PathBuf>,
    pub script: ScriptInfo,
}

impl ExecutionContext {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn define_procedure(&mut self, name: impl Into<String>, body: Block) {
        self.procedures.insert(name.into(), body);
    }
}

/// Builder for constructing an `ExecutionContext`
pub struct ContextBuilder {
    script: ScriptInfo,
    proxy_enabled: bool,
    proxy_path: String,
    natives: Option<NativeRegistry>,
    driver: Option<Box<dyn Driver>>,
    reports_dir: Option<PathBuf>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            script: ScriptInfo::default(),
            proxy_enabled: false,
            proxy_path: String::new(),
            natives: None,
            driver: None,
            reports_dir: None,
        }
    }

    /// Take proxy settings and the report directory from configuration
    pub fn config(mut self, config: &Config) -> Self {
        self.proxy_enabled = config.proxy.enabled;
        self.proxy_path = config.proxy.path.clone();
        self.reports_dir = Some(config.reports.dir.clone());
        self
    }

    pub fn script_name(mut self, name: impl Into<String>) -> Self {
        self.script.name = name.into();
        self
    }

    pub fn parameters(mut self, parameters: Vec<String>) -> Self {
        self.script.parameters = parameters;
        self
    }

    pub fn proxy(mut self, enabled: bool, path: impl Into<String>) -> Self {
        self.proxy_enabled = enabled;
        self.proxy_path = path.into();
        self
    }

    /// Replace the default native table
    pub fn natives(mut self, natives: NativeRegistry) -> Self {
        self.natives = Some(natives);
        self
    }

    /// Use a specific driver instead of the dry-run driver
    pub fn driver(mut self, driver: impl Driver + 'static) -> Self {
        self.driver = Some(Box::new(driver));
        self
    }

    pub fn build(self) -> ExecutionContext {
        let driver: Box<dyn Driver> = match self.driver {
            Some(driver) => driver,
            None => Box::new(self.reports_dir.map(DryRunDriver::new).unwrap_or_default()),
        };

        ExecutionContext {
            variables: HashMap::new(),
            procedures: HashMap::new(),
            natives: self.natives.unwrap_or_else(NativeRegistry::with_defaults),
            session: Session::default(),
            driver,
            proxy_enabled: self.proxy_enabled,
            proxy_path: self.proxy_path,
            net_report_set: false,
            net_report: None,
            script: self.script,
        }
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
