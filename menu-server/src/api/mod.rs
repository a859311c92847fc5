//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`menus`] - 菜单接口 (含餐厅内菜单排序)
//! - [`sections`] - 分区接口 (含菜单内分区排序)
//! - [`items`] - 菜品接口 (含跨分区移动)

pub mod health;
pub mod items;
pub mod menus;
pub mod sections;

use axum::Router;

use crate::core::ServerState;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(menus::router())
        .merge(sections::router())
        .merge(items::router())
}
