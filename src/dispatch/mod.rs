//! # Print Dispatch
//!
//! Sending finished labels somewhere that prints them.
//!
//! ## Contract
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `document` | PDF bytes (`Raster`) or command-language text (`Raw`) |
//! | `printer` | Printer identifier understood by the backend |
//! | `copies` | Always ≥ 1 |
//!
//! Every backend answers with a [`PrintResponse`] (`success`, optional job
//! id, optional error). Backends:
//!
//! - [`PrintNodeClient`]: cloud print service, PDF or raw payloads
//! - [`BridgeClient`]: the local bridge HTTP protocol, raw text only
//!
//! ## Batches
//!
//! [`print_batch`] prepares and sends one label at a time. A label that
//! fails to prepare or to print is counted and logged; the rest of the batch
//! still goes out.

mod bridge;
mod cache;
mod printnode;

pub use bridge::{BridgeClient, BridgeReply, DEFAULT_BRIDGE_URL};
pub use cache::{Cached, TtlCache};
pub use printnode::{DEFAULT_PRINTNODE_URL, PrintNodeClient, PrintNodeConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::error::CardLabelError;
use crate::layout::LabelData;
use crate::render::{FieldConfig, generate_label_pdf_async};

/// Payload handed to a print backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintDocument {
    /// A rendered raster document (PDF bytes).
    Raster(Vec<u8>),
    /// Printer command-language text (TSPL/ZPL).
    Raw(String),
}

/// Wire name of a document's format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentFormat {
    RasterDocument,
    RawCommandText,
}

impl PrintDocument {
    pub fn format(&self) -> DocumentFormat {
        match self {
            PrintDocument::Raster(_) => DocumentFormat::RasterDocument,
            PrintDocument::Raw(_) => DocumentFormat::RawCommandText,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PrintDocument::Raster(bytes) => bytes,
            PrintDocument::Raw(text) => text.as_bytes(),
        }
    }
}

/// One print job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintRequest {
    pub document: PrintDocument,
    pub printer: String,
    pub copies: u32,
    pub title: String,
}

impl PrintRequest {
    /// Build a request; `copies` must be at least 1.
    pub fn new(
        document: PrintDocument,
        printer: impl Into<String>,
        copies: u32,
    ) -> Result<Self, CardLabelError> {
        if copies == 0 {
            return Err(CardLabelError::Validation(
                "copies must be at least 1".to_string(),
            ));
        }
        let printer = printer.into();
        if printer.trim().is_empty() {
            return Err(CardLabelError::Validation(
                "no target printer given".to_string(),
            ));
        }
        Ok(Self {
            document,
            printer,
            copies,
            title: "cardlabel".to_string(),
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Backend answer for a single job.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PrintResponse {
    pub fn ok(job_id: Option<String>) -> Self {
        Self {
            success: true,
            job_id,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            job_id: None,
            error: Some(error.into()),
        }
    }
}

/// A printer as reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterInfo {
    /// Backend-specific identifier when it differs from the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub is_default: bool,
}

impl PrinterInfo {
    /// Identifier to put in [`PrintRequest::printer`].
    pub fn target(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}

/// A print backend.
#[async_trait]
pub trait PrintDispatcher: Send + Sync {
    /// Printers currently reachable through this backend.
    async fn list_printers(&self) -> Result<Vec<PrinterInfo>, CardLabelError>;

    /// Submit one job. Transport failures are `Err`; a backend that answered
    /// but refused the job returns `Ok` with `success == false`.
    async fn submit(&self, request: &PrintRequest) -> Result<PrintResponse, CardLabelError>;
}

/// Aggregate result of [`print_batch`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub success_count: usize,
    pub failed_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_error: Option<String>,
    pub job_ids: Vec<String>,
}

impl BatchOutcome {
    fn record_failure(&mut self, index: usize, error: String) {
        log::warn!("batch item {} failed: {}", index + 1, error);
        self.failed_count += 1;
        if self.first_error.is_none() {
            self.first_error = Some(error);
        }
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed_count == 0
    }
}

/// Prepare and print each item in order, one at a time.
///
/// `prepare` turns an item into a document (for instance by rendering a PDF).
/// Preparation errors and print errors are counted per item and never stop
/// the remaining items.
pub async fn print_batch<D, I, F, Fut>(
    dispatcher: &D,
    printer: &str,
    copies: u32,
    items: I,
    mut prepare: F,
) -> BatchOutcome
where
    D: PrintDispatcher + ?Sized,
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<PrintDocument, CardLabelError>>,
{
    let mut outcome = BatchOutcome::default();

    for (index, item) in items.into_iter().enumerate() {
        let request = match prepare(item)
            .await
            .and_then(|document| PrintRequest::new(document, printer, copies))
        {
            Ok(request) => request.with_title(format!("label {}", index + 1)),
            Err(e) => {
                outcome.record_failure(index, e.to_string());
                continue;
            }
        };

        match dispatcher.submit(&request).await {
            Ok(response) if response.success => {
                outcome.success_count += 1;
                outcome.job_ids.extend(response.job_id);
            }
            Ok(response) => {
                let error = response
                    .error
                    .unwrap_or_else(|| "printer rejected the job".to_string());
                outcome.record_failure(index, error);
            }
            Err(e) => outcome.record_failure(index, e.to_string()),
        }
    }

    log::info!(
        "batch finished: {} sent, {} failed",
        outcome.success_count,
        outcome.failed_count
    );
    outcome
}

/// Render each label to a PDF at `dpi` and print it through `dispatcher`.
pub async fn print_labels<D>(
    dispatcher: &D,
    printer: &str,
    copies: u32,
    config: &FieldConfig,
    labels: Vec<LabelData>,
    dpi: f32,
) -> BatchOutcome
where
    D: PrintDispatcher + ?Sized,
{
    print_batch(dispatcher, printer, copies, labels, |data| {
        let config = config.clone();
        async move {
            generate_label_pdf_async(config, data, dpi)
                .await
                .map(PrintDocument::Raster)
        }
    })
    .await
}
