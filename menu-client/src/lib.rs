//! Menu Client - drag-and-drop ordering client for the menu server
//!
//! Provides the HTTP API client, the drag session state machine and the
//! optimistic [`MenuBoard`] that keeps a reordered list on screen while its
//! positions are saved.

pub mod board;
pub mod config;
pub mod drag;
pub mod error;
pub mod http;
pub mod optimistic;
pub mod sink;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use sink::PositionSink;

pub use board::{BoardState, DropOutcome, MenuBoard, PendingSave};
pub use drag::{DragSession, DragState, Haptics, NoHaptics};
pub use optimistic::Optimistic;

// Re-export shared types for convenience
pub use shared::error::ApiResponse;
pub use shared::reorder::{DragKind, DropLocation};
