//! In-process driver that simulates a browser session
//!
//! No real browser is started. Navigation is recorded in a history, form
//! fields are kept in memory, and when the proxy is enabled every page load
//! lands in the capture as a `GET 200` entry. Reports are real CSV files.

use anyhow::{bail, Context, Result};
use chrono::Local;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};

use super::{Browser, Driver, HarEntry, Proxy, ProxyServer, Session};
use crate::interpreter::Value;

const BLANK_PAGE: &str = "about:blank";

#[derive(Debug, Default)]
struct Capture {
    label: String,
    entries: Vec<HarEntry>,
}

type SharedCapture = Rc<RefCell<Capture>>;

/// Driver that simulates sessions and writes reports to `reports_dir`
#[derive(Debug)]
pub struct DryRunDriver {
    reports_dir: PathBuf,
}

impl DryRunDriver {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Create `<name>_<timestamp>.csv`, adding `_1`, `_2`, ... when a report
    /// with that name already exists
    fn create_report(&self, name: &str) -> Result<(PathBuf, fs::File)> {
        let stem = format!("{}_{}", name, Local::now().format("%Y%m%d_%H%M%S"));
        let mut attempt = 0u32;
        loop {
            let file_name = match attempt {
                0 => format!("{}.csv", stem),
                n => format!("{}_{}.csv", stem, n),
            };
            let path = self.reports_dir.join(file_name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < 1000 => attempt += 1,
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to create report {}", path.display()))
                }
            }
        }
    }
}

impl Default for DryRunDriver {
    fn default() -> Self {
        Self::new("reports")
    }
}

impl Driver for DryRunDriver {
    fn instance_browser(
        &mut self,
        proxy_enabled: bool,
        proxy_path: &str,
        params: &[Value],
    ) -> Result<Session> {
        let kind = params
            .first()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "default".to_string());
        info!(browser = %kind, proxy_enabled, "starting dry-run browser");

        if !proxy_enabled {
            return Ok(Session {
                browser: Some(Box::new(DryRunBrowser::new(None))),
                ..Session::default()
            });
        }

        let capture = SharedCapture::default();
        Ok(Session {
            server: Some(Box::new(DryRunServer {
                address: proxy_path.to_string(),
            })),
            proxy: Some(Box::new(DryRunProxy {
                capture: capture.clone(),
            })),
            browser: Some(Box::new(DryRunBrowser::new(Some(capture)))),
        })
    }

    fn export_net_report(
        &mut self,
        proxy: &dyn Proxy,
        params: &[Value],
        script_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.reports_dir).with_context(|| {
            format!("Failed to create report directory {}", self.reports_dir.display())
        })?;

        let name = match params.first() {
            Some(Value::Text(name)) if !name.is_empty() => name.as_str(),
            _ => script_name,
        };
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            bail!("invalid report name '{}'", name);
        }

        let (path, mut file) = self.create_report(name)?;
        writeln!(file, "url,method,status")?;
        write_entries(&mut file, &proxy.har())?;

        info!(report = %path.display(), "net report exported");
        Ok(path)
    }

    fn reset_har(
        &mut self,
        report_set: bool,
        artifact: Option<&Path>,
        current_url: &str,
        proxy: &mut dyn Proxy,
    ) -> Result<()> {
        if report_set {
            if let Some(path) = artifact {
                let mut file = OpenOptions::new()
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open report {}", path.display()))?;
                write_entries(&mut file, &proxy.har())?;
            }
        }
        proxy.new_har(current_url);
        debug!(label = current_url, "capture reset");
        Ok(())
    }
}

fn write_entries(out: &mut impl Write, entries: &[HarEntry]) -> Result<()> {
    for entry in entries {
        writeln!(
            out,
            "{},{},{}",
            csv_field(&entry.url),
            csv_field(&entry.method),
            entry.status
        )?;
    }
    Ok(())
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/* ===================== Simulated Handles ===================== */

struct DryRunServer {
    address: String,
}

impl ProxyServer for DryRunServer {
    fn address(&self) -> &str {
        &self.address
    }

    fn stop(&mut self) -> Result<()> {
        debug!(address = %self.address, "proxy server stopped");
        Ok(())
    }
}

struct DryRunProxy {
    capture: SharedCapture,
}

impl Proxy for DryRunProxy {
    fn har(&self) -> Vec<HarEntry> {
        self.capture.borrow().entries.clone()
    }

    fn new_har(&mut self, label: &str) {
        let mut capture = self.capture.borrow_mut();
        capture.label = label.to_string();
        capture.entries.clear();
    }

    fn close(&mut self) -> Result<()> {
        debug!(label = %self.capture.borrow().label, "proxy closed");
        Ok(())
    }
}

struct DryRunBrowser {
    history: Vec<String>,
    fields: HashMap<String, String>,
    capture: Option<SharedCapture>,
    closed: bool,
}

impl DryRunBrowser {
    fn new(capture: Option<SharedCapture>) -> Self {
        Self {
            history: Vec::new(),
            fields: HashMap::new(),
            capture,
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            bail!("browser window already closed");
        }
        Ok(())
    }

    fn record(&self, url: &str) {
        if let Some(capture) = &self.capture {
            capture.borrow_mut().entries.push(HarEntry {
                url: url.to_string(),
                method: "GET".to_string(),
                status: 200,
            });
        }
    }
}

impl Browser for DryRunBrowser {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.ensure_open()?;
        if url.trim().is_empty() {
            bail!("cannot navigate to an empty url");
        }
        info!(url, "go_to");
        self.history.push(url.to_string());
        self.fields.clear();
        self.record(url);
        Ok(())
    }

    fn current_url(&self) -> String {
        self.history
            .last()
            .cloned()
            .unwrap_or_else(|| BLANK_PAGE.to_string())
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        self.ensure_open()?;
        info!(selector, "click");
        Ok(())
    }

    fn fill(&mut self, selector: &str, text: &str) -> Result<()> {
        self.ensure_open()?;
        info!(selector, "fill");
        self.fields.insert(selector.to_string(), text.to_string());
        Ok(())
    }

    fn text(&self, selector: &str) -> Result<String> {
        self.ensure_open()?;
        Ok(self.fields.get(selector).cloned().unwrap_or_default())
    }

    fn back(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.history.len() > 1 {
            self.history.pop();
        }
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        self.ensure_open()?;
        let url = self.current_url();
        self.record(&url);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        info!("browser closed");
        Ok(())
    }
}
