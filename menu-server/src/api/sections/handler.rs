//! Section API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{
    BatchPositionRequest, BatchPositionResult, Section, SectionCreate, SectionUpdate,
};

use crate::core::ServerState;
use crate::db::StorageError;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{ApiResponse, AppResult, ErrorCode};

const RESOURCE: &str = "section";

/// GET /api/menus/:menu_id/sections
pub async fn list(
    State(state): State<ServerState>,
    Path(menu_id): Path<i64>,
) -> AppResult<ApiResponse<Vec<Section>>> {
    let sections = state.storage.list_sections(menu_id)?;
    Ok(ApiResponse::success(sections))
}

/// GET /api/sections/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Section>> {
    let section = state
        .storage
        .get_section(id)?
        .ok_or(StorageError::SectionNotFound(id))?;
    Ok(ApiResponse::success(section))
}

/// POST /api/menus/:menu_id/sections
pub async fn create(
    State(state): State<ServerState>,
    Path(menu_id): Path<i64>,
    Json(payload): Json<SectionCreate>,
) -> AppResult<ApiResponse<Section>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN, ErrorCode::SectionNameRequired)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let section = state.storage.create_section(menu_id, payload)?;
    state.bump_version(RESOURCE);
    tracing::info!(section_id = section.id, menu_id, "Section created");

    Ok(ApiResponse::success(section))
}

/// PUT /api/sections/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<SectionUpdate>,
) -> AppResult<ApiResponse<Section>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN, ErrorCode::SectionNameRequired)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let section = state.storage.update_section(id, payload)?;
    state.bump_version(RESOURCE);

    Ok(ApiResponse::success(section))
}

/// DELETE /api/sections/:id - 级联删除菜品
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state.storage.delete_section(id)?;
    state.bump_version(RESOURCE);
    state.bump_version("item");
    tracing::info!(section_id = id, "Section deleted");

    Ok(ApiResponse::ok())
}

/// PUT /api/menus/:menu_id/sections/sort-order
pub async fn batch_update_positions(
    State(state): State<ServerState>,
    Path(menu_id): Path<i64>,
    Json(req): Json<BatchPositionRequest>,
) -> AppResult<ApiResponse<BatchPositionResult>> {
    let updated = state
        .storage
        .apply_section_positions(menu_id, &req.items)
        .inspect_err(|e| {
            tracing::warn!(menu_id, error = %e, "Section position batch rejected");
        })?;

    let version = if updated > 0 {
        state.bump_version(RESOURCE)
    } else {
        state.resource_versions.get(RESOURCE)
    };

    Ok(ApiResponse::success(BatchPositionResult { updated, version }))
}
