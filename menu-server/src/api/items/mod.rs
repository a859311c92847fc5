//! Menu item API 模块

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/sections/{id}/items",
            get(handler::list).post(handler::create),
        )
        // Batch covers every section of the menu (cross-section moves)
        .route(
            "/api/menus/{id}/items/sort-order",
            put(handler::batch_update_positions),
        )
        .route(
            "/api/items/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
}
