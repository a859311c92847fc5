//! Drop events as plain data
//!
//! A [`MoveRequest`] mirrors what a drag-and-drop surface reports on drop:
//! `{ type, source: { droppableId, index }, destination: { droppableId, index } | null }`.
//! `droppable_id` is the parent scope of the list the gesture touched
//! (restaurant for menus, menu for sections, section for items).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::engine::ReorderError;

/// Independent drag surfaces; elements never cross between kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DragKind {
    Menus,
    Sections,
    Items,
}

impl DragKind {
    /// Only menu items may be dropped into a different parent
    pub fn allows_cross_scope(&self) -> bool {
        matches!(self, Self::Items)
    }
}

impl fmt::Display for DragKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Menus => "menus",
            Self::Sections => "sections",
            Self::Items => "items",
        };
        f.write_str(name)
    }
}

/// One end of a drag gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropLocation {
    pub droppable_id: i64,
    pub index: i32,
}

impl DropLocation {
    pub fn new(droppable_id: i64, index: i32) -> Self {
        Self {
            droppable_id,
            index,
        }
    }
}

/// A completed drag gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    #[serde(rename = "type")]
    pub kind: DragKind,
    pub source: DropLocation,
    /// `None` when dropped outside any valid target
    pub destination: Option<DropLocation>,
}

/// How a [`MoveRequest`] must be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    /// Dropped outside any list: nothing changes
    NoDestination,
    /// Reorder within one list
    SameList { scope_id: i64, from: i32, to: i32 },
    /// Move from one list into another
    CrossList {
        source: DropLocation,
        destination: DropLocation,
    },
}

impl MoveRequest {
    pub fn new(kind: DragKind, source: DropLocation, destination: Option<DropLocation>) -> Self {
        Self {
            kind,
            source,
            destination,
        }
    }

    /// Classify the gesture by comparing source and destination scopes
    pub fn target(&self) -> Result<MoveTarget, ReorderError> {
        let Some(destination) = self.destination else {
            return Ok(MoveTarget::NoDestination);
        };

        if destination.droppable_id == self.source.droppable_id {
            return Ok(MoveTarget::SameList {
                scope_id: destination.droppable_id,
                from: self.source.index,
                to: destination.index,
            });
        }

        if !self.kind.allows_cross_scope() {
            return Err(ReorderError::CrossScopeMove { kind: self.kind });
        }

        Ok(MoveTarget::CrossList {
            source: self.source,
            destination,
        })
    }

    /// Dropped back onto the slot it came from
    pub fn is_identity(&self) -> bool {
        self.destination == Some(self.source)
    }
}
