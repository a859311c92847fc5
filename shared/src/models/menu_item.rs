//! Menu Item Model

use serde::{Deserialize, Serialize};

use crate::reorder::{Orderable, Scoped};

/// Menu item entity, scoped to a section
///
/// Items are the only records that can be dragged from one parent
/// (section) into another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub section_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Price in cents
    pub price: i64,
    #[serde(default = "default_true")]
    pub is_available: bool,
    pub position: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub description: Option<String>,
    /// Price in cents
    pub price: i64,
    pub is_available: Option<bool>,
}

/// Update menu item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub is_available: Option<bool>,
}

impl Orderable for MenuItem {
    fn id(&self) -> i64 {
        self.id
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn set_position(&mut self, position: i32) {
        self.position = position;
    }
}

impl Scoped for MenuItem {
    fn scope_id(&self) -> i64 {
        self.section_id
    }

    fn set_scope_id(&mut self, scope_id: i64) {
        self.section_id = scope_id;
    }
}
