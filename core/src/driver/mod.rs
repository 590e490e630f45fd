//! Browser/proxy driver interfaces
//!
//! The executor never talks to a browser directly. A `Driver` provisions a
//! `Session` (proxy server, proxy and browser handles) and exports network
//! reports; the native operations then act on the session's handles.

pub mod dry_run;

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::interpreter::Value;

pub use dry_run::DryRunDriver;

/// One captured request in the proxy's traffic archive
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarEntry {
    pub url: String,
    pub method: String,
    pub status: u16,
}

/// A live browser
pub trait Browser {
    fn navigate(&mut self, url: &str) -> Result<()>;
    fn current_url(&self) -> String;
    fn click(&mut self, selector: &str) -> Result<()>;
    fn fill(&mut self, selector: &str, text: &str) -> Result<()>;
    fn text(&self, selector: &str) -> Result<String>;
    fn back(&mut self) -> Result<()>;
    fn refresh(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// A capturing proxy sitting between the browser and the network
pub trait Proxy {
    /// Snapshot of the current capture
    fn har(&self) -> Vec<HarEntry>;
    /// Drop the current capture and start a new one
    fn new_har(&mut self, label: &str);
    fn close(&mut self) -> Result<()>;
}

/// The process hosting the proxy
pub trait ProxyServer {
    fn address(&self) -> &str;
    fn stop(&mut self) -> Result<()>;
}

/// Everything a provisioned browser session holds. At most one per context.
#[derive(Default)]
pub struct Session {
    pub server: Option<Box<dyn ProxyServer>>,
    pub proxy: Option<Box<dyn Proxy>>,
    pub browser: Option<Box<dyn Browser>>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.browser.is_some() || self.proxy.is_some()
    }

    pub fn browser(&self) -> Result<&Box<dyn Browser>> {
        self.browser
            .as_ref()
            .ok_or_else(|| anyhow!("browser not instanced"))
    }

    pub fn browser_mut(&mut self) -> Result<&mut Box<dyn Browser>> {
        self.browser
            .as_mut()
            .ok_or_else(|| anyhow!("browser not instanced"))
    }

    /// Tear down browser, proxy and server, in that order
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut browser) = self.browser.take() {
            browser.close()?;
        }
        if let Some(mut proxy) = self.proxy.take() {
            proxy.close()?;
        }
        if let Some(mut server) = self.server.take() {
            server.stop()?;
        }
        Ok(())
    }
}

/// Host collaborator that creates sessions and handles traffic reports
pub trait Driver {
    /// Provision a browser, plus a proxy and its server when `proxy_enabled`
    fn instance_browser(
        &mut self,
        proxy_enabled: bool,
        proxy_path: &str,
        params: &[Value],
    ) -> Result<Session>;

    /// Write the proxy capture to a report artifact and return its location
    fn export_net_report(
        &mut self,
        proxy: &dyn Proxy,
        params: &[Value],
        script_name: &str,
    ) -> Result<PathBuf>;

    /// Start a new capture, first flushing the current one into `artifact`
    /// if a report was already exported
    fn reset_har(
        &mut self,
        report_set: bool,
        artifact: Option<&Path>,
        current_url: &str,
        proxy: &mut dyn Proxy,
    ) -> Result<()>;
}
