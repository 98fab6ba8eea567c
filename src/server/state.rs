//! Server state and configuration.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::printer::RawPrinter;
use crate::dispatch::{PrinterInfo, TtlCache};
use crate::error::CardLabelError;
use crate::store::LayoutStore;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:9100")
    pub listen_addr: String,
    /// Printer used when a request names none; otherwise the OS default
    pub default_printer: Option<String>,
    /// How long a printer list stays fresh
    pub printer_cache_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9100".to_string(),
            default_printer: None,
            printer_cache_ttl: Duration::from_secs(30),
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub printer: Arc<dyn RawPrinter>,
    pub layouts: Arc<dyn LayoutStore>,
    pub printer_cache: RwLock<TtlCache<Vec<PrinterInfo>>>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        printer: Arc<dyn RawPrinter>,
        layouts: Arc<dyn LayoutStore>,
    ) -> Self {
        let printer_cache = RwLock::new(TtlCache::new(config.printer_cache_ttl));
        Self {
            config,
            printer,
            layouts,
            printer_cache,
        }
    }

    /// Printer list, from cache while fresh.
    pub async fn printers(&self) -> Result<Vec<PrinterInfo>, CardLabelError> {
        if let Some(printers) = self.printer_cache.read().await.get() {
            return Ok(printers.clone());
        }

        let printers = self.printer.list().await?;
        log::info!("[cache] refreshed printer list ({} printers)", printers.len());
        self.printer_cache.write().await.set(printers.clone());
        Ok(printers)
    }

    /// Resolve the target printer: explicit name, configured default, then
    /// the OS default.
    pub async fn resolve_printer(&self, requested: Option<&str>) -> Result<String, CardLabelError> {
        if let Some(name) = requested.map(str::trim).filter(|n| !n.is_empty()) {
            return Ok(name.to_string());
        }
        if let Some(name) = &self.config.default_printer {
            return Ok(name.clone());
        }
        self.printers()
            .await?
            .into_iter()
            .find(|p| p.is_default)
            .map(|p| p.name)
            .ok_or_else(|| {
                CardLabelError::Validation("no printer given and no default printer".to_string())
            })
    }
}
