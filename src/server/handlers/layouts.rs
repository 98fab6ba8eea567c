//! Saved layout API handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::error_status;
use crate::layout::LabelLayout;
use crate::store::{LayoutFilter, LayoutRecord};

use super::super::state::AppState;

/// Request body for creating a layout.
#[derive(Debug, Deserialize)]
pub struct CreateLayout {
    pub name: String,
    pub category: Option<String>,
    #[serde(default)]
    pub layout: LabelLayout,
}

/// Request body for updating a layout; absent fields are left alone.
#[derive(Debug, Deserialize)]
pub struct UpdateLayout {
    pub name: Option<String>,
    pub layout: Option<LabelLayout>,
}

/// GET /api/layouts - list saved layouts, defaults first.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<LayoutFilter>,
) -> Result<Json<Vec<LayoutRecord>>, (StatusCode, String)> {
    state.layouts.list(&filter).map(Json).map_err(error_status)
}

/// POST /api/layouts - save a new layout.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLayout>,
) -> Result<(StatusCode, Json<LayoutRecord>), (StatusCode, String)> {
    let record = state
        .layouts
        .create(&req.name, req.category.as_deref(), req.layout)
        .map_err(error_status)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/layouts/:id
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<LayoutRecord>, (StatusCode, String)> {
    state.layouts.get(id).map(Json).map_err(error_status)
}

/// PUT /api/layouts/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLayout>,
) -> Result<Json<LayoutRecord>, (StatusCode, String)> {
    let mut record = state.layouts.get(id).map_err(error_status)?;
    if let Some(name) = &req.name {
        record = state.layouts.rename(id, name).map_err(error_status)?;
    }
    if let Some(layout) = req.layout {
        record = state.layouts.update(id, layout).map_err(error_status)?;
    }
    Ok(Json(record))
}

/// DELETE /api/layouts/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.layouts.delete(id).map_err(error_status)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/layouts/:id/default - make this the default of its category.
pub async fn set_default(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<LayoutRecord>, (StatusCode, String)> {
    state.layouts.set_default(id).map(Json).map_err(error_status)
}
