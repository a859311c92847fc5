//! Ordered-collection reorder engine
//!
//! Drives drag-and-drop ordering of menus, sections and menu items.
//!
//! # Flow
//!
//! ```text
//! drop event ──► MoveRequest ──► target()
//!                                  ├─ NoDestination ──► Unchanged
//!                                  ├─ SameList  ──► reorder()      ─┐
//!                                  └─ CrossList ──► move_between() ─┴─► reindex / retag ──► diff_updates
//! ```
//!
//! Every function here is pure: callers own snapshots, receive new
//! snapshots and hand the [`PositionUpdate`](crate::models::PositionUpdate)
//! batch to the persistence layer.
//!
//! # Example
//!
//! ```
//! use shared::reorder::reorder;
//!
//! let list = vec!["A", "B", "C"];
//! assert_eq!(reorder(&list, 0, 2).unwrap(), vec!["B", "C", "A"]);
//! ```

mod engine;
mod plan;
mod position;
mod request;

pub use engine::{MoveResult, NO_INDEX, ReorderError, move_between, reorder};
pub use plan::{ReorderPlan, plan_cross_list, plan_move, plan_same_list};
pub use position::{
    Orderable, Scoped, diff_updates, is_contiguous, position_updates, reindex, retag,
};
pub use request::{DragKind, DropLocation, MoveRequest, MoveTarget};
