//! Pure list transformations behind drag-and-drop
//!
//! Both functions take snapshots and return new vectors; inputs are never
//! mutated. `-1` ([`NO_INDEX`]) in any index means the drag surface could not
//! resolve a source or destination and is treated as a no-op. Any other
//! index outside the collection is a caller bug and is reported as
//! [`ReorderError::IndexOutOfRange`].

use thiserror::Error;

use super::request::DragKind;
use crate::error::{AppError, ErrorCode};

/// Sentinel index emitted by the drag surface when nothing was resolved
pub const NO_INDEX: i32 = -1;

/// Reorder engine errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error("Index {index} is out of range for length {len}")]
    IndexOutOfRange { index: i32, len: usize },

    #[error("{kind} cannot move between groups")]
    CrossScopeMove { kind: DragKind },

    #[error("Unknown drop scope: {scope_id}")]
    UnknownScope { scope_id: i64 },
}

impl From<ReorderError> for AppError {
    fn from(err: ReorderError) -> Self {
        let message = err.to_string();
        match err {
            ReorderError::IndexOutOfRange { index, len } => {
                AppError::with_message(ErrorCode::IndexOutOfRange, message)
                    .with_detail("index", index)
                    .with_detail("len", len)
            }
            ReorderError::CrossScopeMove { kind } => {
                AppError::with_message(ErrorCode::CrossScopeMoveNotAllowed, message)
                    .with_detail("kind", kind.to_string())
            }
            ReorderError::UnknownScope { scope_id } => {
                AppError::with_message(ErrorCode::NotFound, message)
                    .with_detail("scope_id", scope_id)
            }
        }
    }
}

/// Result of a cross-list move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult<T> {
    pub source: Vec<T>,
    pub destination: Vec<T>,
}

/// Index of an existing element (`0..len`)
fn element_index(index: i32, len: usize) -> Result<usize, ReorderError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(ReorderError::IndexOutOfRange { index, len })
}

/// Insertion slot (`0..=len`)
fn insert_index(index: i32, len: usize) -> Result<usize, ReorderError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i <= len)
        .ok_or(ReorderError::IndexOutOfRange { index, len })
}

/// Move the element at `source_index` to `destination_index` within one list.
///
/// Both indices address the original snapshot, so the valid range for each
/// is `0..list.len()`.
pub fn reorder<T: Clone>(
    list: &[T],
    source_index: i32,
    destination_index: i32,
) -> Result<Vec<T>, ReorderError> {
    if source_index == NO_INDEX || destination_index == NO_INDEX {
        return Ok(list.to_vec());
    }

    let from = element_index(source_index, list.len())?;
    let to = element_index(destination_index, list.len())?;

    let mut result = list.to_vec();
    let moved = result.remove(from);
    result.insert(to, moved);
    Ok(result)
}

/// Move the element at `source_index` of `source` into `destination` at
/// `destination_index`.
///
/// `destination_index` may equal `destination.len()` (drop after the last
/// element, or into an empty list).
pub fn move_between<T: Clone>(
    source: &[T],
    destination: &[T],
    source_index: i32,
    destination_index: i32,
) -> Result<MoveResult<T>, ReorderError> {
    if source_index == NO_INDEX || destination_index == NO_INDEX {
        return Ok(MoveResult {
            source: source.to_vec(),
            destination: destination.to_vec(),
        });
    }

    let from = element_index(source_index, source.len())?;
    let to = insert_index(destination_index, destination.len())?;

    let mut result_source = source.to_vec();
    let mut result_destination = destination.to_vec();
    let moved = result_source.remove(from);
    result_destination.insert(to, moved);

    Ok(MoveResult {
        source: result_source,
        destination: result_destination,
    })
}
