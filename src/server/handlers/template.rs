//! Raw template rendering.

use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error_status;
use crate::template::{TemplateEngine, detect_tokens, render_template};

/// Request body for POST /api/template/render.
#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub body: String,
    pub engine: TemplateEngine,
    #[serde(default)]
    pub values: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    pub rendered: String,
    pub required_fields: Vec<String>,
}

/// Handle POST /api/template/render - interpolate and add size guards.
pub async fn render(
    Json(req): Json<RenderRequest>,
) -> Result<Json<RenderResponse>, (StatusCode, String)> {
    let rendered = render_template(&req.body, &req.values, req.engine).map_err(error_status)?;
    Ok(Json(RenderResponse {
        rendered,
        required_fields: detect_tokens(&req.body),
    }))
}
