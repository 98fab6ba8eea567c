//! Local bridge protocol: printer list and raw print.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{check_copies, error_status};
use crate::dispatch::{BridgeReply, PrinterInfo};

use super::super::state::AppState;

fn default_copies() -> u32 {
    1
}

/// Query string of `POST /print`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintQuery {
    pub printer_name: Option<String>,
    #[serde(default = "default_copies")]
    pub copies: u32,
}

/// Handle GET /printers - list OS printers.
pub async fn printers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PrinterInfo>>, (StatusCode, String)> {
    state.printers().await.map(Json).map_err(error_status)
}

/// Handle POST /print - send the raw body `copies` times.
///
/// Each copy is its own print call. 200 when all copies went out, 207 when
/// some did, 500 when none did.
pub async fn print(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PrintQuery>,
    body: Bytes,
) -> Response {
    let copies = match check_copies(query.copies) {
        Ok(copies) => copies,
        Err(e) => return error_status(e).into_response(),
    };
    if body.is_empty() {
        return (StatusCode::BAD_REQUEST, "Body cannot be empty").into_response();
    }

    let printer = match state.resolve_printer(query.printer_name.as_deref()).await {
        Ok(printer) => printer,
        Err(e) => return error_status(e).into_response(),
    };

    let reply = send_copies(&state, &printer, &body, copies).await;
    let status =
        StatusCode::from_u16(reply.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply)).into_response()
}

/// Submit `data` to `printer` once per copy and collect the outcome.
pub(crate) async fn send_copies(
    state: &AppState,
    printer: &str,
    data: &[u8],
    copies: u32,
) -> BridgeReply {
    log::info!("printing {} byte job x{} on {}", data.len(), copies, printer);

    let mut sent = 0;
    let mut errors = Vec::new();
    for copy in 1..=copies {
        match state.printer.send(printer, data).await {
            Ok(()) => sent += 1,
            Err(e) => {
                log::warn!("copy {}/{} on {} failed: {}", copy, copies, printer, e);
                errors.push(e.to_string());
            }
        }
    }
    BridgeReply::from_attempts(copies, sent, errors)
}
