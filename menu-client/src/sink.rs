//! Persistence seam for position batches

use async_trait::async_trait;
use shared::models::PositionUpdate;
use shared::reorder::DragKind;

use crate::ClientResult;

/// Somewhere a position batch can be saved
///
/// `parent_id` is the restaurant for [`DragKind::Menus`] and the menu for
/// sections and items. The batch is applied all-or-nothing.
#[async_trait]
pub trait PositionSink: Send + Sync {
    async fn save_positions(
        &self,
        kind: DragKind,
        parent_id: i64,
        updates: &[PositionUpdate],
    ) -> ClientResult<()>;
}
