//! Label preview, TSPL, PDF and print handlers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::bridge::send_copies;
use super::{check_copies, error_status};
use crate::{
    error::CardLabelError,
    geometry::{MAX_ZOOM, MIN_ZOOM, PRINTER_DPI, PreviewScale},
    layout::{LabelData, LabelLayout},
    render::{
        FieldConfig, LabelSurface, QrRendering, generate_label_pdf_async, render_label_to_canvas,
        render_layout_preview,
    },
    tspl::{PrintSettings, build_tspl, label_data_to_tspl, layout_to_tspl},
};

use super::super::state::AppState;

const MIN_DPI: f32 = 72.0;
const MAX_DPI: f32 = 1200.0;

/// Request body shared by every label endpoint.
///
/// `layout` wins over `layoutId`; with neither, the built-in layout is used
/// (and TSPL falls back to the fixed legacy arrangement).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelRequest {
    pub layout: Option<LabelLayout>,
    pub layout_id: Option<Uuid>,
    pub data: LabelData,
    pub qr: QrRendering,
    pub dpi: Option<f32>,
    pub guides: bool,
    /// Render the field-editor view instead of the print-ready label.
    pub editor: bool,
    pub zoom: Option<f32>,
    pub settings: PrintSettings,
    pub printer: Option<String>,
    pub copies: Option<u32>,
}

impl LabelRequest {
    fn resolve_layout(&self, state: &AppState) -> Result<Option<LabelLayout>, CardLabelError> {
        if let Some(layout) = &self.layout {
            layout.validate()?;
            return Ok(Some(layout.clone()));
        }
        self.layout_id
            .map(|id| state.layouts.get(id).map(|r| r.layout))
            .transpose()
    }

    fn dpi(&self) -> Result<f32, CardLabelError> {
        let dpi = self.dpi.unwrap_or(PRINTER_DPI);
        if !(MIN_DPI..=MAX_DPI).contains(&dpi) {
            return Err(CardLabelError::Validation(format!(
                "dpi must be between {} and {}, got {}",
                MIN_DPI, MAX_DPI, dpi
            )));
        }
        Ok(dpi)
    }

    fn zoom(&self) -> Result<f32, CardLabelError> {
        let zoom = self.zoom.unwrap_or(1.0);
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
            return Err(CardLabelError::Validation(format!(
                "zoom must be between {} and {}, got {}",
                MIN_ZOOM, MAX_ZOOM, zoom
            )));
        }
        Ok(zoom)
    }

    fn field_config(&self, layout: Option<&LabelLayout>) -> FieldConfig {
        let mut config = layout.map(FieldConfig::from).unwrap_or_default();
        config.qr = self.qr;
        config
    }

    fn tspl(&self, layout: Option<&LabelLayout>) -> String {
        let options = match layout {
            Some(layout) => layout_to_tspl(layout, &self.data, self.settings),
            None => label_data_to_tspl(&self.data, self.settings),
        };
        build_tspl(&options)
    }
}

/// Handle POST /api/label/preview - PNG of the label or the editor view.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LabelRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let layout = req.resolve_layout(&state).map_err(error_status)?;
    let dpi = req.dpi().map_err(error_status)?;
    let zoom = req.zoom().map_err(error_status)?;

    let render = move || -> Result<Vec<u8>, CardLabelError> {
        let surface = if req.editor {
            let scale = PreviewScale::zoom(zoom);
            render_layout_preview(&layout.unwrap_or_default(), &req.data, scale)
        } else {
            let config = req.field_config(layout.as_ref());
            let mut surface = LabelSurface::new(PreviewScale::for_output_dpi(dpi));
            render_label_to_canvas(&mut surface, &config, &req.data, req.guides)?;
            surface
        };
        surface.to_png()
    };

    let png_bytes = tokio::task::spawn_blocking(render)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Task error: {}", e),
            )
        })?
        .map_err(error_status)?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png_bytes))
}

/// Handle POST /api/label/tspl - TSPL program text.
pub async fn tspl(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LabelRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let layout = req.resolve_layout(&state).map_err(error_status)?;
    let program = req.tspl(layout.as_ref());
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], program))
}

/// Handle POST /api/label/pdf - single-page 2" × 1" PDF.
pub async fn pdf(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LabelRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let layout = req.resolve_layout(&state).map_err(error_status)?;
    let dpi = req.dpi().map_err(error_status)?;
    let config = req.field_config(layout.as_ref());

    let pdf = generate_label_pdf_async(config, req.data, dpi)
        .await
        .map_err(error_status)?;

    Ok(([(header::CONTENT_TYPE, "application/pdf")], pdf))
}

/// Handle POST /api/label/print - TSPL straight to a printer.
pub async fn print(State(state): State<Arc<AppState>>, Json(req): Json<LabelRequest>) -> Response {
    let copies = match check_copies(req.copies.unwrap_or(1)) {
        Ok(copies) => copies,
        Err(e) => return error_status(e).into_response(),
    };

    let program = match req.resolve_layout(&state) {
        Ok(layout) => req.tspl(layout.as_ref()),
        Err(e) => return error_status(e).into_response(),
    };
    let printer = match state.resolve_printer(req.printer.as_deref()).await {
        Ok(printer) => printer,
        Err(e) => return error_status(e).into_response(),
    };

    let reply = send_copies(&state, &printer, program.as_bytes(), copies).await;
    let status =
        StatusCode::from_u16(reply.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply)).into_response()
}
