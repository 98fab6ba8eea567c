//! OS printer access for the bridge.
//!
//! | Backend | List | Send |
//! |---------|------|------|
//! | [`CupsPrinter`] | `lpstat -p` + `lpstat -d` | `lp -d <name> -o raw` (data on stdin) |
//! | [`SpoolDirPrinter`] | one fixed printer name | writes each job to a file |

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::dispatch::PrinterInfo;
use crate::error::CardLabelError;

/// Something that can pass raw bytes to a named printer.
#[async_trait]
pub trait RawPrinter: Send + Sync {
    async fn list(&self) -> Result<Vec<PrinterInfo>, CardLabelError>;

    /// Submit one job; copies are separate calls.
    async fn send(&self, printer: &str, data: &[u8]) -> Result<(), CardLabelError>;
}

/// CUPS command-line tools.
#[derive(Debug, Clone, Default)]
pub struct CupsPrinter;

#[async_trait]
impl RawPrinter for CupsPrinter {
    async fn list(&self) -> Result<Vec<PrinterInfo>, CardLabelError> {
        let printers = run_lpstat(&["-p"]).await?;
        // lpstat -d exits non-zero on some systems when no default is set
        let default = run_lpstat(&["-d"]).await.unwrap_or_default();
        Ok(parse_lpstat(&printers, parse_default_destination(&default).as_deref()))
    }

    async fn send(&self, printer: &str, data: &[u8]) -> Result<(), CardLabelError> {
        let mut child = Command::new("lp")
            .args(["-d", printer, "-o", "raw"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(data).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(CardLabelError::Dispatch(format!(
                "lp failed for {}: {}",
                printer,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        log::debug!("lp: {}", String::from_utf8_lossy(&output.stdout).trim());
        Ok(())
    }
}

async fn run_lpstat(args: &[&str]) -> Result<String, CardLabelError> {
    let output = Command::new("lpstat").args(args).output().await?;
    if !output.status.success() {
        return Err(CardLabelError::Dispatch(format!(
            "lpstat {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `lpstat -p` output (`printer <name> is idle.  enabled since ...`).
pub fn parse_lpstat(output: &str, default: Option<&str>) -> Vec<PrinterInfo> {
    output
        .lines()
        .filter_map(|line| {
            let rest = line.strip_prefix("printer ")?;
            let (name, state) = rest.split_once(' ')?;
            let status = if state.starts_with("disabled") {
                "disabled"
            } else if state.contains("now printing") {
                "printing"
            } else if state.starts_with("is idle") {
                "idle"
            } else {
                "unknown"
            };
            Some(PrinterInfo {
                id: None,
                name: name.to_string(),
                status: status.to_string(),
                is_default: default == Some(name),
            })
        })
        .collect()
}

/// Parse `lpstat -d` output (`system default destination: <name>`).
pub fn parse_default_destination(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.split_once("default destination:"))
        .map(|(_, name)| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Writes each job to `<dir>/<printer>_<n>.prn`. For machines without a
/// print system, and for tests.
#[derive(Debug)]
pub struct SpoolDirPrinter {
    dir: PathBuf,
    name: String,
    counter: AtomicU64,
}

impl SpoolDirPrinter {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
            counter: AtomicU64::new(0),
        }
    }
}

fn sanitize_printer_name(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[async_trait]
impl RawPrinter for SpoolDirPrinter {
    async fn list(&self) -> Result<Vec<PrinterInfo>, CardLabelError> {
        Ok(vec![PrinterInfo {
            id: None,
            name: self.name.clone(),
            status: "idle".to_string(),
            is_default: true,
        }])
    }

    async fn send(&self, printer: &str, data: &[u8]) -> Result<(), CardLabelError> {
        if printer != self.name {
            return Err(CardLabelError::NotFound(format!("printer {}", printer)));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self
            .dir
            .join(format!("{}_{}.prn", sanitize_printer_name(printer), n));
        tokio::fs::write(&path, data).await?;
        log::info!("spooled {} bytes to {}", data.len(), path.display());
        Ok(())
    }
}
