//! Position batch payloads

use serde::{Deserialize, Serialize};

/// One entry of a position batch
///
/// Positions are absolute, so replaying the same batch is idempotent.
/// `section_id` is only set for menu items that moved to another section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: i64,
    pub position: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<i64>,
}

impl PositionUpdate {
    pub fn new(id: i64, position: i32) -> Self {
        Self {
            id,
            position,
            section_id: None,
        }
    }

    pub fn with_section(mut self, section_id: i64) -> Self {
        self.section_id = Some(section_id);
        self
    }
}

/// Body of the `PUT .../sort-order` endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPositionRequest {
    pub items: Vec<PositionUpdate>,
}

/// Outcome of an applied position batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPositionResult {
    /// Records actually rewritten (replays report 0)
    pub updated: usize,
    /// Resource version after the batch
    pub version: u64,
}
