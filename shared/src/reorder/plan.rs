//! Turning a drop into new sequences plus the batch to persist

use super::engine::{NO_INDEX, ReorderError, move_between, reorder};
use super::position::{Scoped, diff_updates, reindex, retag};
use super::request::{MoveRequest, MoveTarget};
use crate::models::PositionUpdate;

/// Outcome of planning a drop
///
/// New sequences are already reindexed (and retagged for cross-list moves);
/// `updates` holds only the records whose position or parent changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderPlan<T> {
    /// Nothing to apply or persist
    Unchanged,
    Reordered {
        scope_id: i64,
        items: Vec<T>,
        updates: Vec<PositionUpdate>,
    },
    Moved {
        source_scope: i64,
        source: Vec<T>,
        destination_scope: i64,
        destination: Vec<T>,
        updates: Vec<PositionUpdate>,
    },
}

impl<T> ReorderPlan<T> {
    pub fn updates(&self) -> &[PositionUpdate] {
        match self {
            Self::Unchanged => &[],
            Self::Reordered { updates, .. } | Self::Moved { updates, .. } => updates,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// Plan a reorder inside the list owned by `scope_id`
pub fn plan_same_list<T: Scoped + Clone>(
    scope_id: i64,
    list: &[T],
    from: i32,
    to: i32,
) -> Result<ReorderPlan<T>, ReorderError> {
    let mut items = reorder(list, from, to)?;
    if from == NO_INDEX || to == NO_INDEX || from == to {
        return Ok(ReorderPlan::Unchanged);
    }

    reindex(&mut items);
    let updates = diff_updates(list, &items);
    Ok(ReorderPlan::Reordered {
        scope_id,
        items,
        updates,
    })
}

/// Plan moving one record from `source_scope` into `destination_scope`
pub fn plan_cross_list<T: Scoped + Clone>(
    source_scope: i64,
    source: &[T],
    destination_scope: i64,
    destination: &[T],
    from: i32,
    to: i32,
) -> Result<ReorderPlan<T>, ReorderError> {
    let moved = move_between(source, destination, from, to)?;
    if from == NO_INDEX || to == NO_INDEX {
        return Ok(ReorderPlan::Unchanged);
    }

    let mut new_source = moved.source;
    let mut new_destination = moved.destination;
    reindex(&mut new_source);
    reindex(&mut new_destination);
    retag(&mut new_destination, destination_scope);

    let updates = diff_updates(
        source.iter().chain(destination.iter()),
        new_source.iter().chain(new_destination.iter()),
    );
    Ok(ReorderPlan::Moved {
        source_scope,
        source: new_source,
        destination_scope,
        destination: new_destination,
        updates,
    })
}

/// Plan a drop, resolving each `droppable_id` to its current snapshot
pub fn plan_move<'a, T, F>(request: &MoveRequest, lookup: F) -> Result<ReorderPlan<T>, ReorderError>
where
    T: Scoped + Clone + 'a,
    F: Fn(i64) -> Option<&'a [T]>,
{
    match request.target()? {
        MoveTarget::NoDestination => Ok(ReorderPlan::Unchanged),
        MoveTarget::SameList { scope_id, from, to } => {
            let list = lookup(scope_id).ok_or(ReorderError::UnknownScope { scope_id })?;
            plan_same_list(scope_id, list, from, to)
        }
        MoveTarget::CrossList {
            source,
            destination,
        } => {
            let source_list = lookup(source.droppable_id).ok_or(ReorderError::UnknownScope {
                scope_id: source.droppable_id,
            })?;
            let destination_list =
                lookup(destination.droppable_id).ok_or(ReorderError::UnknownScope {
                    scope_id: destination.droppable_id,
                })?;
            tracing::debug!(
                kind = %request.kind,
                from_scope = source.droppable_id,
                to_scope = destination.droppable_id,
                "Planning cross-list move"
            );
            plan_cross_list(
                source.droppable_id,
                source_list,
                destination.droppable_id,
                destination_list,
                source.index,
                destination.index,
            )
        }
    }
}
