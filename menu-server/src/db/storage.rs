//! redb-based storage for the menu catalog
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `menus` | menu id | `Menu` | Menus of every restaurant |
//! | `sections` | section id | `Section` | Sections, linked to a menu by `menu_id` |
//! | `items` | item id | `MenuItem` | Items, linked to a section by `section_id` |
//! | `menus_by_restaurant` | (restaurant id, menu id) | () | Scope index |
//! | `sections_by_menu` | (menu id, section id) | () | Scope index |
//! | `items_by_section` | (section id, item id) | () | Scope index |
//!
//! Values are JSON-serialized. Listing a scope range-scans its index and
//! sorts the fetched records by `(position, id)`.
//!
//! # Position batches
//!
//! A batch is validated in full inside its write transaction before the
//! first insert: every entry must exist under the path scope, and every
//! scope the batch touches must read `0..n` afterwards. A stale or partial
//! batch fails with [`StorageError::PositionConflict`]. Any rejection drops
//! the transaction, so the catalog is untouched. Records whose position and
//! parent already match the batch are not rewritten, which makes replaying
//! the same batch a no-op.

use redb::{Database, ReadableDatabase, ReadableTable, Table, TableDefinition};
use serde::{Serialize, de::DeserializeOwned};
use shared::models::{
    Menu, MenuCreate, MenuItem, MenuItemCreate, MenuItemUpdate, MenuUpdate, PositionUpdate,
    Section, SectionCreate, SectionUpdate,
};
use shared::reorder::{Orderable, Scoped, is_contiguous, reindex};
use shared::util::{now_millis, snowflake_id};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for menus: key = menu id, value = JSON-serialized Menu
const MENUS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("menus");

/// Table for sections: key = section id, value = JSON-serialized Section
const SECTIONS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("sections");

/// Table for menu items: key = item id, value = JSON-serialized MenuItem
const ITEMS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("items");

/// Menu ids per restaurant: key = (restaurant_id, menu_id)
const MENU_INDEX: TableDefinition<(i64, i64), ()> = TableDefinition::new("menus_by_restaurant");

/// Section ids per menu: key = (menu_id, section_id)
const SECTION_INDEX: TableDefinition<(i64, i64), ()> = TableDefinition::new("sections_by_menu");

/// Item ids per section: key = (section_id, item_id)
const ITEM_INDEX: TableDefinition<(i64, i64), ()> = TableDefinition::new("items_by_section");

type Records<'txn> = Table<'txn, i64, &'static [u8]>;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Menu not found: {0}")]
    MenuNotFound(i64),

    #[error("Section not found: {0}")]
    SectionNotFound(i64),

    #[error("Menu item not found: {0}")]
    ItemNotFound(i64),

    #[error("{resource} {id} does not belong to scope {scope_id}")]
    ScopeMismatch {
        resource: &'static str,
        id: i64,
        scope_id: i64,
    },

    #[error("Duplicate id in position batch: {0}")]
    DuplicateId(i64),

    #[error("Invalid position {position} for id {id}")]
    InvalidPosition { id: i64, position: i32 },

    #[error("{resource} {id} cannot change parent")]
    CrossScopeMove { resource: &'static str, id: i64 },

    #[error("Batch would leave {resource} positions of scope {scope_id} out of sequence")]
    PositionConflict {
        resource: &'static str,
        scope_id: i64,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

// ========== Table helpers ==========

/// Ids under `scope_id`, in key order
fn scope_ids<I>(index: &I, scope_id: i64) -> StorageResult<Vec<i64>>
where
    I: ReadableTable<(i64, i64), ()>,
{
    let mut ids = Vec::new();
    for result in index.range((scope_id, i64::MIN)..=(scope_id, i64::MAX))? {
        let (key, _) = result?;
        ids.push(key.value().1);
    }
    Ok(ids)
}

/// Number of records under `scope_id`
fn scope_len<I>(index: &I, scope_id: i64) -> StorageResult<usize>
where
    I: ReadableTable<(i64, i64), ()>,
{
    let mut count = 0;
    for result in index.range((scope_id, i64::MIN)..=(scope_id, i64::MAX))? {
        result?;
        count += 1;
    }
    Ok(count)
}

/// Records under `scope_id`, in display order
fn scan_scope<T, R, I>(table: &R, index: &I, scope_id: i64) -> StorageResult<Vec<T>>
where
    T: Scoped + DeserializeOwned,
    R: ReadableTable<i64, &'static [u8]>,
    I: ReadableTable<(i64, i64), ()>,
{
    let mut records = Vec::new();
    for id in scope_ids(index, scope_id)? {
        match fetch::<T, R>(table, id)? {
            Some(record) => records.push(record),
            None => tracing::warn!(id, scope_id, "Index entry without record"),
        }
    }
    records.sort_by_key(|record: &T| (record.position(), record.id()));
    Ok(records)
}

fn fetch<T, R>(table: &R, id: i64) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<i64, &'static [u8]>,
{
    match table.get(id)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

fn put<T: Orderable + Serialize>(table: &mut Records<'_>, record: &T) -> StorageResult<()> {
    let value = serde_json::to_vec(record)?;
    table.insert(record.id(), value.as_slice())?;
    Ok(())
}

/// A snowflake id not yet used in `table`
fn fresh_id<R>(table: &R) -> StorageResult<i64>
where
    R: ReadableTable<i64, &'static [u8]>,
{
    loop {
        let id = snowflake_id();
        if table.get(id)?.is_none() {
            return Ok(id);
        }
        tracing::debug!(id, "Snowflake id collision, regenerating");
    }
}

/// Close the gap a delete left under `scope_id`
fn compact<T, I>(table: &mut Records<'_>, index: &I, scope_id: i64) -> StorageResult<usize>
where
    T: Scoped + Serialize + DeserializeOwned,
    I: ReadableTable<(i64, i64), ()>,
{
    let mut siblings: Vec<T> = scan_scope(&*table, index, scope_id)?;
    let before: Vec<i32> = siblings.iter().map(|s| s.position()).collect();
    reindex(&mut siblings);

    let mut moved = 0;
    for (sibling, old) in siblings.iter().zip(before) {
        if sibling.position() != old {
            put(table, sibling)?;
            moved += 1;
        }
    }
    Ok(moved)
}

/// Reject negative positions and repeated ids
fn validate_batch(updates: &[PositionUpdate]) -> StorageResult<()> {
    let mut seen = HashSet::with_capacity(updates.len());
    for update in updates {
        if update.position < 0 {
            return Err(StorageError::InvalidPosition {
                id: update.id,
                position: update.position,
            });
        }
        if !seen.insert(update.id) {
            return Err(StorageError::DuplicateId(update.id));
        }
    }
    Ok(())
}

/// Resolve a batch whose records stay under `scope_id`
///
/// Returns only the records whose position changes.
fn stage_same_scope<T, R>(
    table: &R,
    scope_id: i64,
    updates: &[PositionUpdate],
    resource: &'static str,
    missing: fn(i64) -> StorageError,
) -> StorageResult<Vec<T>>
where
    T: Scoped + DeserializeOwned,
    R: ReadableTable<i64, &'static [u8]>,
{
    let mut staged = Vec::with_capacity(updates.len());
    for update in updates {
        if update.section_id.is_some() {
            return Err(StorageError::CrossScopeMove {
                resource,
                id: update.id,
            });
        }
        let mut record: T = fetch(table, update.id)?.ok_or_else(|| missing(update.id))?;
        if record.scope_id() != scope_id {
            return Err(StorageError::ScopeMismatch {
                resource,
                id: update.id,
                scope_id,
            });
        }
        if record.position() != update.position {
            record.set_position(update.position);
            staged.push(record);
        }
    }
    Ok(staged)
}

/// Every scope in `scopes` must read `0..n` once `staged` is written
///
/// `index` still reflects the pre-batch parents.
fn ensure_contiguous<T, R, I>(
    table: &R,
    index: &I,
    scopes: &BTreeSet<i64>,
    staged: &[T],
    resource: &'static str,
) -> StorageResult<()>
where
    T: Scoped + Clone + DeserializeOwned,
    R: ReadableTable<i64, &'static [u8]>,
    I: ReadableTable<(i64, i64), ()>,
{
    let staged_ids: HashSet<i64> = staged.iter().map(|record| record.id()).collect();

    for &scope_id in scopes {
        let mut after: Vec<T> = scan_scope::<T, R, I>(table, index, scope_id)?
            .into_iter()
            .filter(|record| !staged_ids.contains(&record.id()))
            .chain(
                staged
                    .iter()
                    .filter(|record| record.scope_id() == scope_id)
                    .cloned(),
            )
            .collect();
        after.sort_by_key(|record| (record.position(), record.id()));

        if !is_contiguous(&after) {
            return Err(StorageError::PositionConflict { resource, scope_id });
        }
    }
    Ok(())
}

/// Menu catalog backed by redb
#[derive(Clone)]
pub struct CatalogStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for CatalogStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStorage").finish_non_exhaustive()
    }
}

impl CatalogStorage {
    /// Open or create the database at the given path
    ///
    /// Commits are durable as soon as `commit()` returns.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Create all tables if they don't exist
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(MENUS_TABLE)?;
            let _ = write_txn.open_table(SECTIONS_TABLE)?;
            let _ = write_txn.open_table(ITEMS_TABLE)?;
            let _ = write_txn.open_table(MENU_INDEX)?;
            let _ = write_txn.open_table(SECTION_INDEX)?;
            let _ = write_txn.open_table(ITEM_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    // ========== Menus ==========

    /// Menus of a restaurant, in display order
    pub fn list_menus(&self, restaurant_id: i64) -> StorageResult<Vec<Menu>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MENUS_TABLE)?;
        let index = read_txn.open_table(MENU_INDEX)?;
        scan_scope(&table, &index, restaurant_id)
    }

    pub fn get_menu(&self, id: i64) -> StorageResult<Option<Menu>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MENUS_TABLE)?;
        fetch(&table, id)
    }

    /// Create a menu at the end of the restaurant's list
    pub fn create_menu(&self, restaurant_id: i64, payload: MenuCreate) -> StorageResult<Menu> {
        let txn = self.db.begin_write()?;
        let menu = {
            let mut table = txn.open_table(MENUS_TABLE)?;
            let mut index = txn.open_table(MENU_INDEX)?;
            let position = scope_len(&index, restaurant_id)? as i32;
            let now = now_millis();
            let menu = Menu {
                id: fresh_id(&table)?,
                restaurant_id,
                name: payload.name,
                description: payload.description,
                is_published: payload.is_published.unwrap_or(false),
                position,
                created_at: now,
                updated_at: now,
            };
            put(&mut table, &menu)?;
            index.insert((restaurant_id, menu.id), ())?;
            menu
        };
        txn.commit()?;
        Ok(menu)
    }

    pub fn update_menu(&self, id: i64, payload: MenuUpdate) -> StorageResult<Menu> {
        let txn = self.db.begin_write()?;
        let menu = {
            let mut table = txn.open_table(MENUS_TABLE)?;
            let mut menu: Menu = fetch(&table, id)?.ok_or(StorageError::MenuNotFound(id))?;
            if let Some(name) = payload.name {
                menu.name = name;
            }
            if let Some(description) = payload.description {
                menu.description = Some(description);
            }
            if let Some(is_published) = payload.is_published {
                menu.is_published = is_published;
            }
            menu.updated_at = now_millis();
            put(&mut table, &menu)?;
            menu
        };
        txn.commit()?;
        Ok(menu)
    }

    /// Delete a menu with its sections and their items
    pub fn delete_menu(&self, id: i64) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut menus = txn.open_table(MENUS_TABLE)?;
            let mut sections = txn.open_table(SECTIONS_TABLE)?;
            let mut items = txn.open_table(ITEMS_TABLE)?;
            let mut menu_index = txn.open_table(MENU_INDEX)?;
            let mut section_index = txn.open_table(SECTION_INDEX)?;
            let mut item_index = txn.open_table(ITEM_INDEX)?;

            let menu: Menu = fetch(&menus, id)?.ok_or(StorageError::MenuNotFound(id))?;
            let section_ids = scope_ids(&section_index, id)?;

            let mut item_count = 0;
            for &section_id in &section_ids {
                for item_id in scope_ids(&item_index, section_id)? {
                    items.remove(item_id)?;
                    item_index.remove((section_id, item_id))?;
                    item_count += 1;
                }
                sections.remove(section_id)?;
                section_index.remove((id, section_id))?;
            }
            menus.remove(id)?;
            menu_index.remove((menu.restaurant_id, id))?;
            compact::<Menu, _>(&mut menus, &menu_index, menu.restaurant_id)?;

            tracing::debug!(
                menu_id = id,
                sections = section_ids.len(),
                items = item_count,
                "Menu deleted with children"
            );
        }
        txn.commit()?;
        Ok(())
    }

    /// Apply a menu position batch for one restaurant
    ///
    /// Returns the number of menus rewritten.
    pub fn apply_menu_positions(
        &self,
        restaurant_id: i64,
        updates: &[PositionUpdate],
    ) -> StorageResult<usize> {
        if updates.is_empty() {
            return Ok(0);
        }
        validate_batch(updates)?;

        let txn = self.db.begin_write()?;
        let changed = {
            let mut table = txn.open_table(MENUS_TABLE)?;
            let index = txn.open_table(MENU_INDEX)?;
            let mut staged: Vec<Menu> = stage_same_scope(
                &table,
                restaurant_id,
                updates,
                "menu",
                StorageError::MenuNotFound,
            )?;
            if staged.is_empty() {
                return Ok(0);
            }
            ensure_contiguous(&table, &index, &BTreeSet::from([restaurant_id]), &staged, "menu")?;

            let now = now_millis();
            for menu in &mut staged {
                menu.updated_at = now;
                put(&mut table, menu)?;
            }
            staged.len()
        };
        txn.commit()?;
        Ok(changed)
    }

    // ========== Sections ==========

    /// Sections of a menu, in display order
    pub fn list_sections(&self, menu_id: i64) -> StorageResult<Vec<Section>> {
        let read_txn = self.db.begin_read()?;
        let menus = read_txn.open_table(MENUS_TABLE)?;
        if menus.get(menu_id)?.is_none() {
            return Err(StorageError::MenuNotFound(menu_id));
        }
        let table = read_txn.open_table(SECTIONS_TABLE)?;
        let index = read_txn.open_table(SECTION_INDEX)?;
        scan_scope(&table, &index, menu_id)
    }

    pub fn get_section(&self, id: i64) -> StorageResult<Option<Section>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SECTIONS_TABLE)?;
        fetch(&table, id)
    }

    /// Create a section at the end of the menu
    pub fn create_section(&self, menu_id: i64, payload: SectionCreate) -> StorageResult<Section> {
        let txn = self.db.begin_write()?;
        let section = {
            let menus = txn.open_table(MENUS_TABLE)?;
            if menus.get(menu_id)?.is_none() {
                return Err(StorageError::MenuNotFound(menu_id));
            }
            let mut table = txn.open_table(SECTIONS_TABLE)?;
            let mut index = txn.open_table(SECTION_INDEX)?;
            let position = scope_len(&index, menu_id)? as i32;
            let now = now_millis();
            let section = Section {
                id: fresh_id(&table)?,
                menu_id,
                name: payload.name,
                description: payload.description,
                position,
                created_at: now,
                updated_at: now,
            };
            put(&mut table, &section)?;
            index.insert((menu_id, section.id), ())?;
            section
        };
        txn.commit()?;
        Ok(section)
    }

    pub fn update_section(&self, id: i64, payload: SectionUpdate) -> StorageResult<Section> {
        let txn = self.db.begin_write()?;
        let section = {
            let mut table = txn.open_table(SECTIONS_TABLE)?;
            let mut section: Section =
                fetch(&table, id)?.ok_or(StorageError::SectionNotFound(id))?;
            if let Some(name) = payload.name {
                section.name = name;
            }
            if let Some(description) = payload.description {
                section.description = Some(description);
            }
            section.updated_at = now_millis();
            put(&mut table, &section)?;
            section
        };
        txn.commit()?;
        Ok(section)
    }

    /// Delete a section and its items
    pub fn delete_section(&self, id: i64) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut sections = txn.open_table(SECTIONS_TABLE)?;
            let mut items = txn.open_table(ITEMS_TABLE)?;
            let mut section_index = txn.open_table(SECTION_INDEX)?;
            let mut item_index = txn.open_table(ITEM_INDEX)?;

            let section: Section =
                fetch(&sections, id)?.ok_or(StorageError::SectionNotFound(id))?;
            let item_ids = scope_ids(&item_index, id)?;

            for &item_id in &item_ids {
                items.remove(item_id)?;
                item_index.remove((id, item_id))?;
            }
            sections.remove(id)?;
            section_index.remove((section.menu_id, id))?;
            compact::<Section, _>(&mut sections, &section_index, section.menu_id)?;

            tracing::debug!(section_id = id, items = item_ids.len(), "Section deleted with items");
        }
        txn.commit()?;
        Ok(())
    }

    /// Apply a section position batch for one menu
    pub fn apply_section_positions(
        &self,
        menu_id: i64,
        updates: &[PositionUpdate],
    ) -> StorageResult<usize> {
        if updates.is_empty() {
            return Ok(0);
        }
        validate_batch(updates)?;

        let txn = self.db.begin_write()?;
        let changed = {
            let mut table = txn.open_table(SECTIONS_TABLE)?;
            let index = txn.open_table(SECTION_INDEX)?;
            let mut staged: Vec<Section> = stage_same_scope(
                &table,
                menu_id,
                updates,
                "section",
                StorageError::SectionNotFound,
            )?;
            if staged.is_empty() {
                return Ok(0);
            }
            ensure_contiguous(&table, &index, &BTreeSet::from([menu_id]), &staged, "section")?;

            let now = now_millis();
            for section in &mut staged {
                section.updated_at = now;
                put(&mut table, section)?;
            }
            staged.len()
        };
        txn.commit()?;
        Ok(changed)
    }

    // ========== Menu items ==========

    /// Items of a section, in display order
    pub fn list_items(&self, section_id: i64) -> StorageResult<Vec<MenuItem>> {
        let read_txn = self.db.begin_read()?;
        let sections = read_txn.open_table(SECTIONS_TABLE)?;
        if sections.get(section_id)?.is_none() {
            return Err(StorageError::SectionNotFound(section_id));
        }
        let table = read_txn.open_table(ITEMS_TABLE)?;
        let index = read_txn.open_table(ITEM_INDEX)?;
        scan_scope(&table, &index, section_id)
    }

    pub fn get_item(&self, id: i64) -> StorageResult<Option<MenuItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ITEMS_TABLE)?;
        fetch(&table, id)
    }

    /// Create an item at the end of the section
    pub fn create_item(&self, section_id: i64, payload: MenuItemCreate) -> StorageResult<MenuItem> {
        let txn = self.db.begin_write()?;
        let item = {
            let sections = txn.open_table(SECTIONS_TABLE)?;
            if sections.get(section_id)?.is_none() {
                return Err(StorageError::SectionNotFound(section_id));
            }
            let mut table = txn.open_table(ITEMS_TABLE)?;
            let mut index = txn.open_table(ITEM_INDEX)?;
            let position = scope_len(&index, section_id)? as i32;
            let now = now_millis();
            let item = MenuItem {
                id: fresh_id(&table)?,
                section_id,
                name: payload.name,
                description: payload.description,
                price: payload.price,
                is_available: payload.is_available.unwrap_or(true),
                position,
                created_at: now,
                updated_at: now,
            };
            put(&mut table, &item)?;
            index.insert((section_id, item.id), ())?;
            item
        };
        txn.commit()?;
        Ok(item)
    }

    pub fn update_item(&self, id: i64, payload: MenuItemUpdate) -> StorageResult<MenuItem> {
        let txn = self.db.begin_write()?;
        let item = {
            let mut table = txn.open_table(ITEMS_TABLE)?;
            let mut item: MenuItem = fetch(&table, id)?.ok_or(StorageError::ItemNotFound(id))?;
            if let Some(name) = payload.name {
                item.name = name;
            }
            if let Some(description) = payload.description {
                item.description = Some(description);
            }
            if let Some(price) = payload.price {
                item.price = price;
            }
            if let Some(is_available) = payload.is_available {
                item.is_available = is_available;
            }
            item.updated_at = now_millis();
            put(&mut table, &item)?;
            item
        };
        txn.commit()?;
        Ok(item)
    }

    pub fn delete_item(&self, id: i64) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ITEMS_TABLE)?;
            let mut index = txn.open_table(ITEM_INDEX)?;
            let item: MenuItem = fetch(&table, id)?.ok_or(StorageError::ItemNotFound(id))?;
            table.remove(id)?;
            index.remove((item.section_id, id))?;
            compact::<MenuItem, _>(&mut table, &index, item.section_id)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Apply an item position batch for one menu
    ///
    /// Entries carrying `section_id` move the item to that section, which
    /// must belong to the same menu. Both the source and the destination
    /// section must read `0..n` afterwards.
    pub fn apply_item_positions(
        &self,
        menu_id: i64,
        updates: &[PositionUpdate],
    ) -> StorageResult<usize> {
        if updates.is_empty() {
            return Ok(0);
        }
        validate_batch(updates)?;

        let txn = self.db.begin_write()?;
        let changed = {
            let sections = txn.open_table(SECTIONS_TABLE)?;
            let section_index = txn.open_table(SECTION_INDEX)?;
            let mut items = txn.open_table(ITEMS_TABLE)?;
            let mut item_index = txn.open_table(ITEM_INDEX)?;

            let menu_sections: HashSet<i64> =
                scope_ids(&section_index, menu_id)?.into_iter().collect();

            let mut staged: Vec<MenuItem> = Vec::with_capacity(updates.len());
            let mut moves: Vec<(i64, i64, i64)> = Vec::new();
            let mut touched = BTreeSet::new();
            for update in updates {
                let mut item: MenuItem = fetch(&items, update.id)?
                    .ok_or(StorageError::ItemNotFound(update.id))?;
                if !menu_sections.contains(&item.section_id) {
                    return Err(StorageError::ScopeMismatch {
                        resource: "item",
                        id: update.id,
                        scope_id: menu_id,
                    });
                }

                let section_id = match update.section_id {
                    Some(target) if !menu_sections.contains(&target) => {
                        return Err(match fetch::<Section, _>(&sections, target)? {
                            Some(_) => StorageError::ScopeMismatch {
                                resource: "section",
                                id: target,
                                scope_id: menu_id,
                            },
                            None => StorageError::SectionNotFound(target),
                        });
                    }
                    Some(target) => target,
                    None => item.section_id,
                };

                if item.position == update.position && item.section_id == section_id {
                    continue;
                }
                touched.insert(item.section_id);
                touched.insert(section_id);
                if item.section_id != section_id {
                    tracing::debug!(
                        item_id = item.id,
                        from = item.section_id,
                        to = section_id,
                        "Item moves section"
                    );
                    moves.push((item.id, item.section_id, section_id));
                }
                item.position = update.position;
                item.section_id = section_id;
                staged.push(item);
            }
            if staged.is_empty() {
                return Ok(0);
            }
            ensure_contiguous(&items, &item_index, &touched, &staged, "item")?;

            let now = now_millis();
            for item in &mut staged {
                item.updated_at = now;
                put(&mut items, item)?;
            }
            for (item_id, from, to) in moves {
                item_index.remove((from, item_id))?;
                item_index.insert((to, item_id), ())?;
            }
            staged.len()
        };
        txn.commit()?;
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESTAURANT: i64 = 1;

    fn menu_create(name: &str) -> MenuCreate {
        MenuCreate {
            name: name.to_string(),
            description: None,
            is_published: None,
        }
    }

    fn section_create(name: &str) -> SectionCreate {
        SectionCreate {
            name: name.to_string(),
            description: None,
        }
    }

    fn item_create(name: &str) -> MenuItemCreate {
        MenuItemCreate {
            name: name.to_string(),
            description: None,
            price: 1200,
            is_available: None,
        }
    }

    fn names<T>(records: &[T], name: impl Fn(&T) -> String) -> Vec<String> {
        records.iter().map(name).collect()
    }

    /// One menu with sections "Starters" [Soup, Salad] and "Mains" [Steak]
    fn seeded() -> (CatalogStorage, Menu, Section, Section) {
        let storage = CatalogStorage::open_in_memory().unwrap();
        let menu = storage.create_menu(RESTAURANT, menu_create("Dinner")).unwrap();
        let starters = storage.create_section(menu.id, section_create("Starters")).unwrap();
        let mains = storage.create_section(menu.id, section_create("Mains")).unwrap();
        storage.create_item(starters.id, item_create("Soup")).unwrap();
        storage.create_item(starters.id, item_create("Salad")).unwrap();
        storage.create_item(mains.id, item_create("Steak")).unwrap();
        (storage, menu, starters, mains)
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    #[test]
    fn test_create_appends_positions() {
        let storage = CatalogStorage::open_in_memory().unwrap();
        for name in ["Breakfast", "Lunch", "Dinner"] {
            storage.create_menu(RESTAURANT, menu_create(name)).unwrap();
        }
        storage.create_menu(2, menu_create("Other")).unwrap();

        let menus = storage.list_menus(RESTAURANT).unwrap();
        assert_eq!(names(&menus, |m| m.name.clone()), vec!["Breakfast", "Lunch", "Dinner"]);
        assert!(is_contiguous(&menus));
        assert!(!menus[0].is_published);
    }

    #[test]
    fn test_children_require_parent() {
        let storage = CatalogStorage::open_in_memory().unwrap();
        assert!(matches!(
            storage.create_section(42, section_create("Orphan")),
            Err(StorageError::MenuNotFound(42))
        ));
        assert!(matches!(
            storage.create_item(43, item_create("Orphan")),
            Err(StorageError::SectionNotFound(43))
        ));
        assert!(matches!(
            storage.list_sections(42),
            Err(StorageError::MenuNotFound(42))
        ));
    }

    #[test]
    fn test_update_keeps_position() {
        let (storage, _menu, starters, _mains) = seeded();
        let soup = storage.list_items(starters.id).unwrap().remove(0);
        let updated = storage
            .update_item(
                soup.id,
                MenuItemUpdate {
                    price: Some(1500),
                    is_available: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.price, 1500);
        assert!(!updated.is_available);
        assert_eq!(updated.position, soup.position);
        assert_eq!(updated.name, "Soup");
    }

    #[test]
    fn test_delete_menu_cascades() {
        let (storage, menu, starters, mains) = seeded();
        let soup = storage.list_items(starters.id).unwrap().remove(0);

        storage.delete_menu(menu.id).unwrap();

        assert!(storage.get_menu(menu.id).unwrap().is_none());
        assert!(storage.get_section(starters.id).unwrap().is_none());
        assert!(storage.get_section(mains.id).unwrap().is_none());
        assert!(storage.get_item(soup.id).unwrap().is_none());
        assert!(matches!(
            storage.delete_menu(menu.id),
            Err(StorageError::MenuNotFound(_))
        ));
    }

    #[test]
    fn test_delete_closes_gap() {
        let storage = CatalogStorage::open_in_memory().unwrap();
        let first = storage.create_menu(RESTAURANT, menu_create("A")).unwrap();
        storage.create_menu(RESTAURANT, menu_create("B")).unwrap();
        storage.create_menu(RESTAURANT, menu_create("C")).unwrap();

        storage.delete_menu(first.id).unwrap();

        let menus = storage.list_menus(RESTAURANT).unwrap();
        assert_eq!(names(&menus, |m| m.name.clone()), vec!["B", "C"]);
        assert!(is_contiguous(&menus));
    }

    // ========================================================================
    // Position batches
    // ========================================================================

    #[test]
    fn test_apply_menu_positions() {
        let storage = CatalogStorage::open_in_memory().unwrap();
        let a = storage.create_menu(RESTAURANT, menu_create("A")).unwrap();
        let b = storage.create_menu(RESTAURANT, menu_create("B")).unwrap();
        let c = storage.create_menu(RESTAURANT, menu_create("C")).unwrap();

        // [A, B, C] -> [B, C, A]
        let changed = storage
            .apply_menu_positions(
                RESTAURANT,
                &[
                    PositionUpdate::new(b.id, 0),
                    PositionUpdate::new(c.id, 1),
                    PositionUpdate::new(a.id, 2),
                ],
            )
            .unwrap();
        assert_eq!(changed, 3);

        let menus = storage.list_menus(RESTAURANT).unwrap();
        assert_eq!(names(&menus, |m| m.name.clone()), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let storage = CatalogStorage::open_in_memory().unwrap();
        assert_eq!(storage.apply_menu_positions(RESTAURANT, &[]).unwrap(), 0);
        assert_eq!(storage.apply_section_positions(99, &[]).unwrap(), 0);
        assert_eq!(storage.apply_item_positions(99, &[]).unwrap(), 0);
    }

    #[test]
    fn test_foreign_id_rejects_whole_batch() {
        let storage = CatalogStorage::open_in_memory().unwrap();
        let a = storage.create_menu(RESTAURANT, menu_create("A")).unwrap();
        let b = storage.create_menu(RESTAURANT, menu_create("B")).unwrap();
        let foreign = storage.create_menu(2, menu_create("Elsewhere")).unwrap();
        let before = storage.list_menus(RESTAURANT).unwrap();

        let result = storage.apply_menu_positions(
            RESTAURANT,
            &[
                PositionUpdate::new(b.id, 0),
                PositionUpdate::new(a.id, 1),
                PositionUpdate::new(foreign.id, 2),
            ],
        );
        assert!(matches!(
            result,
            Err(StorageError::ScopeMismatch { resource: "menu", scope_id: RESTAURANT, .. })
        ));
        assert_eq!(storage.list_menus(RESTAURANT).unwrap(), before);
    }

    #[test]
    fn test_unknown_id_rejects_whole_batch() {
        let (storage, menu, starters, _mains) = seeded();
        let before = storage.list_items(starters.id).unwrap();

        let result = storage.apply_item_positions(
            menu.id,
            &[
                PositionUpdate::new(before[1].id, 0),
                PositionUpdate::new(999, 1),
            ],
        );
        assert!(matches!(result, Err(StorageError::ItemNotFound(999))));
        assert_eq!(storage.list_items(starters.id).unwrap(), before);
    }

    #[test]
    fn test_batch_shape_validation() {
        let storage = CatalogStorage::open_in_memory().unwrap();
        let a = storage.create_menu(RESTAURANT, menu_create("A")).unwrap();

        assert!(matches!(
            storage.apply_menu_positions(
                RESTAURANT,
                &[PositionUpdate::new(a.id, 0), PositionUpdate::new(a.id, 1)]
            ),
            Err(StorageError::DuplicateId(id)) if id == a.id
        ));
        assert!(matches!(
            storage.apply_menu_positions(RESTAURANT, &[PositionUpdate::new(a.id, -1)]),
            Err(StorageError::InvalidPosition { position: -1, .. })
        ));
        assert!(matches!(
            storage.apply_menu_positions(RESTAURANT, &[PositionUpdate::new(a.id, 0).with_section(5)]),
            Err(StorageError::CrossScopeMove { resource: "menu", .. })
        ));
    }

    #[test]
    fn test_replayed_batch_is_idempotent() {
        let (storage, menu, starters, mains) = seeded();
        let starters_items = storage.list_items(starters.id).unwrap();
        let batch = [
            PositionUpdate::new(mains.id, 0),
            PositionUpdate::new(starters.id, 1),
        ];

        assert_eq!(storage.apply_section_positions(menu.id, &batch).unwrap(), 2);
        let first = storage.list_sections(menu.id).unwrap();

        assert_eq!(storage.apply_section_positions(menu.id, &batch).unwrap(), 0);
        assert_eq!(storage.list_sections(menu.id).unwrap(), first);
        assert_eq!(storage.list_items(starters.id).unwrap(), starters_items);
    }

    #[test]
    fn test_cross_section_item_move() {
        let (storage, menu, starters, mains) = seeded();
        let soup = storage.list_items(starters.id).unwrap().remove(0);
        let salad = storage.list_items(starters.id).unwrap().remove(1);

        // Soup -> Mains index 1
        let changed = storage
            .apply_item_positions(
                menu.id,
                &[
                    PositionUpdate::new(salad.id, 0),
                    PositionUpdate::new(soup.id, 1).with_section(mains.id),
                ],
            )
            .unwrap();
        assert_eq!(changed, 2);

        let starters_items = storage.list_items(starters.id).unwrap();
        let mains_items = storage.list_items(mains.id).unwrap();
        assert_eq!(names(&starters_items, |i| i.name.clone()), vec!["Salad"]);
        assert_eq!(names(&mains_items, |i| i.name.clone()), vec!["Steak", "Soup"]);
        assert!(is_contiguous(&starters_items));
        assert!(is_contiguous(&mains_items));
        assert_eq!(mains_items[1].section_id, mains.id);
    }

    #[test]
    fn test_item_move_to_other_menu_rejected() {
        let (storage, menu, starters, _mains) = seeded();
        let other_menu = storage.create_menu(RESTAURANT, menu_create("Brunch")).unwrap();
        let other_section = storage
            .create_section(other_menu.id, section_create("Eggs"))
            .unwrap();
        let before = storage.list_items(starters.id).unwrap();

        let result = storage.apply_item_positions(
            menu.id,
            &[PositionUpdate::new(before[0].id, 0).with_section(other_section.id)],
        );
        assert!(matches!(
            result,
            Err(StorageError::ScopeMismatch { resource: "section", .. })
        ));

        let result = storage.apply_item_positions(
            menu.id,
            &[PositionUpdate::new(before[0].id, 0).with_section(12345)],
        );
        assert!(matches!(result, Err(StorageError::SectionNotFound(12345))));
        assert_eq!(storage.list_items(starters.id).unwrap(), before);
        assert!(storage.list_items(other_section.id).unwrap().is_empty());
    }

    #[test]
    fn test_stale_batch_from_same_snapshot_rejected() {
        let storage = CatalogStorage::open_in_memory().unwrap();
        let a = storage.create_menu(RESTAURANT, menu_create("A")).unwrap();
        let b = storage.create_menu(RESTAURANT, menu_create("B")).unwrap();
        let c = storage.create_menu(RESTAURANT, menu_create("C")).unwrap();

        // Both planned against [A, B, C]: swap A/B, then B to the end
        let first = [PositionUpdate::new(b.id, 0), PositionUpdate::new(a.id, 1)];
        let second = [PositionUpdate::new(c.id, 1), PositionUpdate::new(b.id, 2)];

        assert_eq!(storage.apply_menu_positions(RESTAURANT, &first).unwrap(), 2);
        let result = storage.apply_menu_positions(RESTAURANT, &second);
        assert!(matches!(
            result,
            Err(StorageError::PositionConflict { resource: "menu", scope_id: RESTAURANT })
        ));

        let menus = storage.list_menus(RESTAURANT).unwrap();
        assert_eq!(names(&menus, |m| m.name.clone()), vec!["B", "A", "C"]);
        assert!(is_contiguous(&menus));
        assert_eq!(storage.get_menu(c.id).unwrap().map(|m| m.position), Some(2));
    }

    #[test]
    fn test_partial_batch_rejected() {
        let (storage, menu, starters, mains) = seeded();
        let before = storage.list_sections(menu.id).unwrap();

        // Mains to the front without shifting Starters
        let result = storage.apply_section_positions(menu.id, &[PositionUpdate::new(mains.id, 0)]);
        assert!(matches!(
            result,
            Err(StorageError::PositionConflict { resource: "section", .. })
        ));
        assert_eq!(storage.list_sections(menu.id).unwrap(), before);

        // Same for items, with a gap instead of a duplicate
        let items = storage.list_items(starters.id).unwrap();
        let result = storage.apply_item_positions(menu.id, &[PositionUpdate::new(items[1].id, 2)]);
        assert!(matches!(
            result,
            Err(StorageError::PositionConflict { resource: "item", scope_id }) if scope_id == starters.id
        ));
        assert_eq!(storage.list_items(starters.id).unwrap(), items);
    }

    #[test]
    fn test_cross_move_must_close_source_gap() {
        let (storage, menu, starters, mains) = seeded();
        let starters_before = storage.list_items(starters.id).unwrap();
        let mains_before = storage.list_items(mains.id).unwrap();
        let soup = &starters_before[0];

        // Soup -> Mains, but Salad keeps position 1
        let result = storage.apply_item_positions(
            menu.id,
            &[PositionUpdate::new(soup.id, 1).with_section(mains.id)],
        );
        assert!(matches!(
            result,
            Err(StorageError::PositionConflict { resource: "item", scope_id }) if scope_id == starters.id
        ));
        assert_eq!(storage.list_items(starters.id).unwrap(), starters_before);
        assert_eq!(storage.list_items(mains.id).unwrap(), mains_before);
    }

    #[test]
    fn test_moved_item_follows_new_section() {
        let (storage, menu, starters, mains) = seeded();
        let items = storage.list_items(starters.id).unwrap();
        let (soup, salad) = (&items[0], &items[1]);

        storage
            .apply_item_positions(
                menu.id,
                &[
                    PositionUpdate::new(salad.id, 0),
                    PositionUpdate::new(soup.id, 0).with_section(mains.id),
                    PositionUpdate::new(storage.list_items(mains.id).unwrap()[0].id, 1),
                ],
            )
            .unwrap();

        // Deleting Starters must leave Soup alone
        storage.delete_section(starters.id).unwrap();
        let mains_items = storage.list_items(mains.id).unwrap();
        assert_eq!(names(&mains_items, |i| i.name.clone()), vec!["Soup", "Steak"]);
        assert!(storage.get_item(salad.id).unwrap().is_none());

        // And deleting Soup compacts Mains
        storage.delete_item(soup.id).unwrap();
        let mains_items = storage.list_items(mains.id).unwrap();
        assert_eq!(names(&mains_items, |i| i.name.clone()), vec!["Steak"]);
        assert!(is_contiguous(&mains_items));
    }

    #[test]
    fn test_create_after_delete_appends_at_end() {
        let (storage, _menu, starters, mains) = seeded();
        let soup = storage.list_items(starters.id).unwrap().remove(0);

        storage.delete_item(soup.id).unwrap();
        storage.create_item(starters.id, item_create("Bread")).unwrap();
        storage.create_item(mains.id, item_create("Fish")).unwrap();

        let starters_items = storage.list_items(starters.id).unwrap();
        let mains_items = storage.list_items(mains.id).unwrap();
        assert_eq!(names(&starters_items, |i| i.name.clone()), vec!["Salad", "Bread"]);
        assert_eq!(names(&mains_items, |i| i.name.clone()), vec!["Steak", "Fish"]);
        assert!(is_contiguous(&starters_items));
        assert!(is_contiguous(&mains_items));
    }

    #[test]
    fn test_rapid_creates_get_distinct_ids() {
        let (storage, _menu, starters, _mains) = seeded();
        for n in 0..200 {
            storage
                .create_item(starters.id, item_create(&format!("Special {n}")))
                .unwrap();
        }

        let items = storage.list_items(starters.id).unwrap();
        let ids: HashSet<i64> = items.iter().map(|i| i.id).collect();
        assert_eq!(items.len(), 202);
        assert_eq!(ids.len(), 202);
        assert!(is_contiguous(&items));
    }

    #[test]
    fn test_reopen_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.redb");

        let menu_id = {
            let storage = CatalogStorage::open(&path).unwrap();
            let a = storage.create_menu(RESTAURANT, menu_create("A")).unwrap();
            let b = storage.create_menu(RESTAURANT, menu_create("B")).unwrap();
            storage
                .apply_menu_positions(
                    RESTAURANT,
                    &[PositionUpdate::new(b.id, 0), PositionUpdate::new(a.id, 1)],
                )
                .unwrap();
            a.id
        };

        let storage = CatalogStorage::open(&path).unwrap();
        let menus = storage.list_menus(RESTAURANT).unwrap();
        assert_eq!(names(&menus, |m| m.name.clone()), vec!["B", "A"]);
        assert_eq!(storage.get_menu(menu_id).unwrap().map(|m| m.position), Some(1));
    }
}
