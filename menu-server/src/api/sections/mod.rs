//! Section API 模块

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

// Path params share the `{id}` name per prefix; the router rejects
// differently named captures at the same segment.
pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/menus/{id}/sections",
            get(handler::list).post(handler::create),
        )
        .route(
            "/api/menus/{id}/sections/sort-order",
            put(handler::batch_update_positions),
        )
        .route(
            "/api/sections/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
}
