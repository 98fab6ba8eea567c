//! PrintNode cloud print client.
//!
//! Jobs are posted to `/printjobs` with the payload base64-encoded:
//!
//! | Document | `contentType` |
//! |----------|---------------|
//! | `Raster` (PDF) | `pdf_base64` |
//! | `Raw` (TSPL/ZPL) | `raw_base64` |
//!
//! Authentication is HTTP basic with the API key as user name and an empty
//! password. Copies are sent as `options.copies` and PrintNode repeats the job.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use super::{PrintDispatcher, PrintDocument, PrintRequest, PrintResponse, PrinterInfo};
use crate::error::CardLabelError;

pub const DEFAULT_PRINTNODE_URL: &str = "https://api.printnode.com";

/// Credentials and endpoint.
#[derive(Debug, Clone)]
pub struct PrintNodeConfig {
    pub api_key: String,
    pub base_url: String,
}

impl PrintNodeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_PRINTNODE_URL.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrintJob<'a> {
    printer_id: u64,
    title: &'a str,
    content_type: &'static str,
    content: String,
    source: &'static str,
    options: JobOptions,
}

#[derive(Debug, Serialize)]
struct JobOptions {
    copies: u32,
}

#[derive(Debug, Deserialize)]
struct RemotePrinter {
    id: u64,
    name: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    default: bool,
}

/// [`PrintDispatcher`] backed by the PrintNode REST API.
pub struct PrintNodeClient {
    config: PrintNodeConfig,
    http: reqwest::Client,
}

impl PrintNodeClient {
    pub fn new(config: PrintNodeConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

/// Map a document to PrintNode's `contentType` and base64 body.
fn encode_content(document: &PrintDocument) -> (&'static str, String) {
    let content_type = match document {
        PrintDocument::Raster(_) => "pdf_base64",
        PrintDocument::Raw(_) => "raw_base64",
    };
    (content_type, STANDARD.encode(document.as_bytes()))
}

fn parse_printer_id(target: &str) -> Result<u64, CardLabelError> {
    target.trim().parse().map_err(|_| {
        CardLabelError::Validation(format!(
            "PrintNode printer id must be numeric, got '{}'",
            target
        ))
    })
}

#[async_trait]
impl PrintDispatcher for PrintNodeClient {
    async fn list_printers(&self) -> Result<Vec<PrinterInfo>, CardLabelError> {
        let printers: Vec<RemotePrinter> = self
            .http
            .get(self.url("/printers"))
            .basic_auth(&self.config.api_key, Some(""))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(printers
            .into_iter()
            .map(|p| PrinterInfo {
                id: Some(p.id.to_string()),
                name: p.name,
                status: p.state.unwrap_or_else(|| "unknown".to_string()),
                is_default: p.default,
            })
            .collect())
    }

    async fn submit(&self, request: &PrintRequest) -> Result<PrintResponse, CardLabelError> {
        let (content_type, content) = encode_content(&request.document);
        let job = PrintJob {
            printer_id: parse_printer_id(&request.printer)?,
            title: &request.title,
            content_type,
            content,
            source: "cardlabel",
            options: JobOptions {
                copies: request.copies,
            },
        };

        let response = self
            .http
            .post(self.url("/printjobs"))
            .basic_auth(&self.config.api_key, Some(""))
            .json(&job)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("PrintNode rejected job: {} {}", status, body);
            return Ok(PrintResponse::failed(format!("PrintNode returned {}: {}", status, body)));
        }

        // The API answers with the bare numeric job id.
        let reply: serde_json::Value = response.json().await?;
        let job_id = job_id_from_reply(&reply);
        log::debug!("PrintNode job {:?} queued on {}", job_id, request.printer);
        Ok(PrintResponse::ok(job_id))
    }
}

/// Job id from a submit reply: a bare number, or a string on some proxies.
fn job_id_from_reply(reply: &serde_json::Value) -> Option<String> {
    reply
        .as_u64()
        .map(|id| id.to_string())
        .or_else(|| reply.as_str().map(str::to_string))
}
