//! Menu Model

use serde::{Deserialize, Serialize};

use crate::reorder::{Orderable, Scoped};

/// Menu entity, scoped to a restaurant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Whether diners can see this menu on the public site
    #[serde(default)]
    pub is_published: bool,
    pub position: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create menu payload
///
/// New menus are appended after the last existing menu of the restaurant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCreate {
    pub name: String,
    pub description: Option<String>,
    pub is_published: Option<bool>,
}

/// Update menu payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
}

impl Orderable for Menu {
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

impl Scoped for Menu {
    fn scope_id(&self) -> i64 {
        self.restaurant_id
    }

    fn set_scope_id(&mut self, scope_id: i64) {
        self.restaurant_id = scope_id;
    }
}
