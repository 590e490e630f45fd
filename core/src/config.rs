//! Runtime configuration
//!
//! Sources, lowest to highest precedence:
//! 1. built-in defaults
//! 2. config file: `--config PATH`, else `NBZ_CONFIG_PATH`, else `./nbz.toml` if present
//! 3. environment variables, `NBZ_` prefix with `__` between sections
//!    (`NBZ_PROXY__ENABLED=true`)
//! 4. programmatic overrides (CLI flags)
//!
//! A `.env` file in the working directory is loaded first.

use anyhow::{Context, Result};
use config::{Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub proxy: ProxyConfig,
    pub reports: ReportsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Route the browser through a capturing proxy
    pub enabled: bool,
    /// Path to the proxy server launcher
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportsConfig {
    /// Where exported network reports are written
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default tracing filter when `RUST_LOG` is not set
    pub level: String,
}

impl Config {
    /// Load from defaults, file and environment
    pub fn load() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder applying overrides on top of the file/env sources
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    overrides: Vec<(String, config::Value)>,
    skip_env: bool,
}

impl ConfigBuilder {
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn proxy_enabled(mut self, enabled: bool) -> Self {
        self.overrides
            .push(("proxy.enabled".to_string(), enabled.into()));
        self
    }

    pub fn reports_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into().display().to_string();
        self.overrides.push(("reports.dir".to_string(), dir.into()));
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        let level: String = level.into();
        self.overrides.push(("log.level".to_string(), level.into()));
        self
    }

    /// Ignore `.env` and `NBZ_*` variables (tests)
    pub fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    pub fn build(self) -> Result<Config> {
        if !self.skip_env {
            let _ = dotenvy::dotenv();
        }

        let mut builder = config::Config::builder()
            .set_default("proxy.enabled", false)?
            .set_default("proxy.path", "browsermob-proxy")?
            .set_default("reports.dir", "reports")?
            .set_default("log.level", "info")?;

        let path = self.config_path.or_else(|| {
            if self.skip_env {
                None
            } else {
                env::var_os("NBZ_CONFIG_PATH").map(PathBuf::from)
            }
        });
        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("nbz").required(false)),
        };

        if !self.skip_env {
            builder = builder.add_source(
                Environment::with_prefix("NBZ")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        for (key, value) in self.overrides {
            builder = builder.set_override(key, value)?;
        }

        builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}
