//! Menu API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{BatchPositionRequest, BatchPositionResult, Menu, MenuCreate, MenuUpdate};

use crate::core::ServerState;
use crate::db::StorageError;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{ApiResponse, AppResult, ErrorCode};

const RESOURCE: &str = "menu";

/// GET /api/restaurants/:restaurant_id/menus - 按位置列出菜单
pub async fn list(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<i64>,
) -> AppResult<ApiResponse<Vec<Menu>>> {
    let menus = state.storage.list_menus(restaurant_id)?;
    Ok(ApiResponse::success(menus))
}

/// GET /api/menus/:id - 获取单个菜单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Menu>> {
    let menu = state
        .storage
        .get_menu(id)?
        .ok_or(StorageError::MenuNotFound(id))?;
    Ok(ApiResponse::success(menu))
}

/// POST /api/restaurants/:restaurant_id/menus - 创建菜单 (追加到末尾)
pub async fn create(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<MenuCreate>,
) -> AppResult<ApiResponse<Menu>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN, ErrorCode::MenuNameRequired)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let menu = state.storage.create_menu(restaurant_id, payload)?;
    state.bump_version(RESOURCE);
    tracing::info!(menu_id = menu.id, restaurant_id, "Menu created");

    Ok(ApiResponse::success(menu))
}

/// PUT /api/menus/:id - 更新菜单
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuUpdate>,
) -> AppResult<ApiResponse<Menu>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN, ErrorCode::MenuNameRequired)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let menu = state.storage.update_menu(id, payload)?;
    state.bump_version(RESOURCE);

    Ok(ApiResponse::success(menu))
}

/// DELETE /api/menus/:id - 删除菜单 (级联删除分区和菜品)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state.storage.delete_menu(id)?;
    state.bump_version(RESOURCE);
    state.bump_version("section");
    state.bump_version("item");
    tracing::info!(menu_id = id, "Menu deleted");

    Ok(ApiResponse::ok())
}

/// PUT /api/restaurants/:restaurant_id/menus/sort-order - 批量更新菜单位置
pub async fn batch_update_positions(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<i64>,
    Json(req): Json<BatchPositionRequest>,
) -> AppResult<ApiResponse<BatchPositionResult>> {
    let updated = state
        .storage
        .apply_menu_positions(restaurant_id, &req.items)
        .inspect_err(|e| {
            tracing::warn!(restaurant_id, error = %e, "Menu position batch rejected");
        })?;

    let version = if updated > 0 {
        state.bump_version(RESOURCE)
    } else {
        state.resource_versions.get(RESOURCE)
    };

    Ok(ApiResponse::success(BatchPositionResult { updated, version }))
}
