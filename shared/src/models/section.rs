//! Section Model

use serde::{Deserialize, Serialize};

use crate::reorder::{Orderable, Scoped};

/// Section entity (e.g. "Starters", "Desserts"), scoped to a menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub menu_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub position: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create section payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionCreate {
    pub name: String,
    pub description: Option<String>,
}

/// Update section payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Orderable for Section {
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

impl Scoped for Section {
    fn scope_id(&self) -> i64 {
        self.menu_id
    }

    fn set_scope_id(&mut self, scope_id: i64) {
        self.menu_id = scope_id;
    }
}
