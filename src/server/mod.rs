//! # HTTP Server: Print Bridge and Label API
//!
//! Runs next to the printer. Speaks the local bridge protocol (raw command
//! text in, OS print jobs out) and serves label previews, TSPL, PDFs and
//! saved layouts.
//!
//! ## Usage
//!
//! ```bash
//! cardlabel serve --listen 127.0.0.1:9100 --printer Zebra_ZD410
//! ```
//!
//! ## Routes
//!
//! | Method | Path | Body | Answer |
//! |--------|------|------|--------|
//! | GET | `/printers` | | `[{name, status, isDefault}]` |
//! | POST | `/print?printerName=&copies=` | raw command text | `200` / `207` / `500` `{success, jobsSent, ...}` |
//! | POST | `/api/label/preview` | label request | PNG |
//! | POST | `/api/label/tspl` | label request | TSPL text |
//! | POST | `/api/label/pdf` | label request | PDF |
//! | POST | `/api/label/print` | label request | as `/print` |
//! | POST | `/api/template/render` | `{body, engine, values}` | `{rendered, requiredFields}` |
//! | GET/POST | `/api/layouts` | | saved layouts |
//! | GET/PUT/DELETE | `/api/layouts/:id` | | one layout |
//! | POST | `/api/layouts/:id/default` | | mark default |

mod handlers;
mod printer;
mod state;

pub use printer::{
    CupsPrinter, RawPrinter, SpoolDirPrinter, parse_default_destination, parse_lpstat,
};
pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::error::CardLabelError;
use crate::store::MemoryLayoutStore;

/// Build the router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Bridge protocol
        .route("/printers", get(handlers::bridge::printers))
        .route("/print", post(handlers::bridge::print))
        // Label API
        .route("/api/label/preview", post(handlers::label::preview))
        .route("/api/label/tspl", post(handlers::label::tspl))
        .route("/api/label/pdf", post(handlers::label::pdf))
        .route("/api/label/print", post(handlers::label::print))
        // Template API
        .route("/api/template/render", post(handlers::template::render))
        // Layout API
        .route(
            "/api/layouts",
            get(handlers::layouts::list).post(handlers::layouts::create),
        )
        .route(
            "/api/layouts/:id",
            get(handlers::layouts::get)
                .put(handlers::layouts::update)
                .delete(handlers::layouts::delete),
        )
        .route(
            "/api/layouts/:id/default",
            post(handlers::layouts::set_default),
        )
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use std::sync::Arc;
/// use cardlabel::server::{serve, CupsPrinter, ServerConfig};
///
/// # async fn example() -> Result<(), cardlabel::error::CardLabelError> {
/// serve(ServerConfig::default(), Arc::new(CupsPrinter)).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(
    config: ServerConfig,
    printer: Arc<dyn RawPrinter>,
) -> Result<(), CardLabelError> {
    let state = Arc::new(AppState::new(
        config.clone(),
        printer,
        Arc::new(MemoryLayoutStore::new()),
    ));
    let app = router(state);

    log::info!("cardlabel bridge listening on {}", config.listen_addr);
    match &config.default_printer {
        Some(name) => log::info!("default printer: {}", name),
        None => log::info!("default printer: system default"),
    }

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            CardLabelError::Dispatch(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| CardLabelError::Dispatch(format!("Server error: {}", e)))?;

    Ok(())
}
