//! Menu item API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{
    BatchPositionRequest, BatchPositionResult, MenuItem, MenuItemCreate, MenuItemUpdate,
};

use crate::core::ServerState;
use crate::db::StorageError;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_price, validate_required_text,
};
use crate::utils::{ApiResponse, AppResult, ErrorCode};

const RESOURCE: &str = "item";

/// GET /api/sections/:section_id/items
pub async fn list(
    State(state): State<ServerState>,
    Path(section_id): Path<i64>,
) -> AppResult<ApiResponse<Vec<MenuItem>>> {
    let items = state.storage.list_items(section_id)?;
    Ok(ApiResponse::success(items))
}

/// GET /api/items/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<MenuItem>> {
    let item = state
        .storage
        .get_item(id)?
        .ok_or(StorageError::ItemNotFound(id))?;
    Ok(ApiResponse::success(item))
}

/// POST /api/sections/:section_id/items
pub async fn create(
    State(state): State<ServerState>,
    Path(section_id): Path<i64>,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<ApiResponse<MenuItem>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN, ErrorCode::MenuItemNameRequired)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_price(payload.price)?;

    let item = state.storage.create_item(section_id, payload)?;
    state.bump_version(RESOURCE);
    tracing::info!(item_id = item.id, section_id, "Menu item created");

    Ok(ApiResponse::success(item))
}

/// PUT /api/items/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<ApiResponse<MenuItem>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN, ErrorCode::MenuItemNameRequired)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    if let Some(price) = payload.price {
        validate_price(price)?;
    }

    let item = state.storage.update_item(id, payload)?;
    state.bump_version(RESOURCE);

    Ok(ApiResponse::success(item))
}

/// DELETE /api/items/:id
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state.storage.delete_item(id)?;
    state.bump_version(RESOURCE);

    Ok(ApiResponse::ok())
}

/// PUT /api/menus/:menu_id/items/sort-order - 同分区排序与跨分区移动
pub async fn batch_update_positions(
    State(state): State<ServerState>,
    Path(menu_id): Path<i64>,
    Json(req): Json<BatchPositionRequest>,
) -> AppResult<ApiResponse<BatchPositionResult>> {
    let updated = state
        .storage
        .apply_item_positions(menu_id, &req.items)
        .inspect_err(|e| {
            tracing::warn!(menu_id, error = %e, "Item position batch rejected");
        })?;

    let version = if updated > 0 {
        state.bump_version(RESOURCE)
    } else {
        state.resource_versions.get(RESOURCE)
    };

    Ok(ApiResponse::success(BatchPositionResult { updated, version }))
}
