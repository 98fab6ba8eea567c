//! HTTP handlers for the server.

pub mod bridge;
pub mod label;
pub mod layouts;
pub mod template;

use axum::http::StatusCode;

use crate::error::CardLabelError;

/// Upper bound on copies per print request.
pub const MAX_COPIES: u32 = 999;

/// Reject copy counts outside `1..=MAX_COPIES`.
pub(crate) fn check_copies(copies: u32) -> Result<u32, CardLabelError> {
    if !(1..=MAX_COPIES).contains(&copies) {
        return Err(CardLabelError::Validation(format!(
            "copies must be between 1 and {}, got {}",
            MAX_COPIES, copies
        )));
    }
    Ok(copies)
}

/// Map a library error to the status and message a handler returns.
pub(crate) fn error_status(e: CardLabelError) -> (StatusCode, String) {
    let status = match &e {
        CardLabelError::Validation(_) | CardLabelError::MissingVariable(_) => {
            StatusCode::BAD_REQUEST
        }
        CardLabelError::NotFound(_) => StatusCode::NOT_FOUND,
        CardLabelError::Dispatch(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}
