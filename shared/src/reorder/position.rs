//! Position bookkeeping for ordered collections

use std::collections::HashMap;

use crate::models::PositionUpdate;

/// A record with an identity and a materialized display position
pub trait Orderable {
    fn id(&self) -> i64;
    fn position(&self) -> i32;
    fn set_position(&mut self, position: i32);
}

/// An orderable record that belongs to a parent scope
pub trait Scoped: Orderable {
    fn scope_id(&self) -> i64;
    fn set_scope_id(&mut self, scope_id: i64);
}

/// Rewrite every position to its array index
pub fn reindex<T: Orderable>(list: &mut [T]) {
    for (index, item) in list.iter_mut().enumerate() {
        item.set_position(index as i32);
    }
}

/// Move every element under `scope_id`
pub fn retag<T: Scoped>(list: &mut [T], scope_id: i64) {
    for item in list.iter_mut() {
        item.set_scope_id(scope_id);
    }
}

/// `{id, position = index}` for every element
pub fn position_updates<T: Orderable>(list: &[T]) -> Vec<PositionUpdate> {
    list.iter()
        .enumerate()
        .map(|(index, item)| PositionUpdate::new(item.id(), index as i32))
        .collect()
}

/// Positions form `0..len` in order
pub fn is_contiguous<T: Orderable>(list: &[T]) -> bool {
    list.iter()
        .enumerate()
        .all(|(index, item)| item.position() == index as i32)
}

/// Minimal batch turning `before` into `after`
///
/// `after` must already be reindexed (and retagged for cross-list moves).
/// Only records whose position or scope differs from `before` are emitted;
/// `section_id` is set only when the scope changed.
pub fn diff_updates<'a, T>(
    before: impl IntoIterator<Item = &'a T>,
    after: impl IntoIterator<Item = &'a T>,
) -> Vec<PositionUpdate>
where
    T: Scoped + 'a,
{
    let previous: HashMap<i64, (i32, i64)> = before
        .into_iter()
        .map(|item| (item.id(), (item.position(), item.scope_id())))
        .collect();

    after
        .into_iter()
        .filter_map(|item| {
            let update = PositionUpdate::new(item.id(), item.position());
            match previous.get(&item.id()) {
                Some(&(_, scope_id)) if scope_id != item.scope_id() => {
                    Some(update.with_section(item.scope_id()))
                }
                Some(&(position, _)) if position == item.position() => None,
                Some(_) => Some(update),
                None => Some(update.with_section(item.scope_id())),
            }
        })
        .collect()
}
