//! Menu API 模块

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/restaurants/{restaurant_id}/menus",
            get(handler::list).post(handler::create),
        )
        .route(
            "/api/restaurants/{restaurant_id}/menus/sort-order",
            put(handler::batch_update_positions),
        )
        .route(
            "/api/menus/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
}
