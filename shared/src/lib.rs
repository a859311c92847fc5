//! Shared types for GetTheMenu
//!
//! Common types used across menu-server and menu-client: the reorder
//! engine, menu models, error types and response structures.

pub mod error;
pub mod models;
pub mod reorder;
pub mod util;

// Re-exports
pub use axum::Json;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use reorder::{DragKind, DropLocation, MoveRequest, ReorderError, ReorderPlan};
