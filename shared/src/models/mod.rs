//! Data models
//!
//! Shared between menu-server and its clients (via API).
//! All IDs are `i64` (snowflake), positions are `i32`.

pub mod menu;
pub mod menu_item;
pub mod position;
pub mod section;

// Re-exports
pub use menu::*;
pub use menu_item::*;
pub use position::*;
pub use section::*;
