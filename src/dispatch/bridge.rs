//! Client for the local print bridge.
//!
//! The bridge is a small HTTP service next to the printer (see
//! [`crate::server`]):
//!
//! ```text
//! GET  /printers                          → [{name, status, isDefault}]
//! POST /print?printerName=<p>&copies=<n>  body: raw command text
//!      200 {success, jobsSent, message}     every copy sent
//!      207 {success, jobsSent, errors[]}    some copies failed
//!      500 {success, jobsSent, errors[]}    nothing printed
//! ```
//!
//! Only raw command text can go through the bridge.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{PrintDispatcher, PrintDocument, PrintRequest, PrintResponse, PrinterInfo};
use crate::error::CardLabelError;

pub const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:9100";

/// Body of every `POST /print` answer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeReply {
    pub success: bool,
    pub jobs_sent: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl BridgeReply {
    /// Reply for `sent` successful submits out of `copies`, with the errors
    /// collected from the failed ones.
    pub fn from_attempts(copies: u32, sent: u32, errors: Vec<String>) -> Self {
        if errors.is_empty() {
            Self {
                success: true,
                jobs_sent: sent,
                message: Some(format!("Sent {} of {} job(s)", sent, copies)),
                errors,
            }
        } else {
            Self {
                success: false,
                jobs_sent: sent,
                message: None,
                errors,
            }
        }
    }

    /// HTTP status code the bridge answers with.
    pub fn status_code(&self) -> u16 {
        if self.errors.is_empty() {
            200
        } else if self.jobs_sent > 0 {
            207
        } else {
            500
        }
    }
}

/// [`PrintDispatcher`] talking to a bridge over HTTP.
pub struct BridgeClient {
    base_url: String,
    http: reqwest::Client,
}

impl BridgeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Default for BridgeClient {
    fn default() -> Self {
        Self::new(DEFAULT_BRIDGE_URL)
    }
}

#[async_trait]
impl PrintDispatcher for BridgeClient {
    async fn list_printers(&self) -> Result<Vec<PrinterInfo>, CardLabelError> {
        let printers = self
            .http
            .get(self.url("/printers"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(printers)
    }

    async fn submit(&self, request: &PrintRequest) -> Result<PrintResponse, CardLabelError> {
        let body = match &request.document {
            PrintDocument::Raw(text) => text.clone(),
            PrintDocument::Raster(_) => {
                return Err(CardLabelError::Dispatch(
                    "the print bridge only accepts raw command text".to_string(),
                ));
            }
        };

        let copies = request.copies.to_string();
        let response = self
            .http
            .post(self.url("/print"))
            .query(&[
                ("printerName", request.printer.as_str()),
                ("copies", copies.as_str()),
            ])
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let reply: BridgeReply = response.json().await?;
        log::debug!(
            "bridge answered {} for {} ({} job(s) sent)",
            status,
            request.printer,
            reply.jobs_sent
        );

        if status.is_success() && reply.success && reply.errors.is_empty() {
            Ok(PrintResponse::ok(None))
        } else {
            let error = if reply.errors.is_empty() {
                format!("bridge returned {}", status)
            } else {
                reply.errors.join("; ")
            };
            Ok(PrintResponse::failed(error))
        }
    }
}
