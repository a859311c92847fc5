//! Menu editing board
//!
//! Holds one restaurant's menus plus one menu's sections and items. A drop
//! is planned with the reorder engine and adopted immediately as the
//! optimistic state; [`MenuBoard::persist`] then saves the batch and either
//! commits or restores the pre-drag state.
//!
//! Droppable ids: the restaurant id for menus, the menu id for sections,
//! the section id for items.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use shared::models::{Menu, MenuItem, PositionUpdate, Section};
use shared::reorder::{DragKind, DropLocation, MoveRequest, ReorderError, ReorderPlan, plan_move};

use crate::drag::{DragSession, DragState, Haptics};
use crate::optimistic::Optimistic;
use crate::{ClientConfig, ClientError, ClientResult, HttpClient, PositionSink};

/// Snapshot rendered by the board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    pub menus: Vec<Menu>,
    pub sections: Vec<Section>,
    /// Items per section id; every section has an entry, possibly empty
    pub items: BTreeMap<i64, Vec<MenuItem>>,
}

impl BoardState {
    pub fn new(mut menus: Vec<Menu>, mut sections: Vec<Section>, items: Vec<MenuItem>) -> Self {
        menus.sort_by_key(|m| (m.position, m.id));
        sections.sort_by_key(|s| (s.position, s.id));

        let mut grouped: BTreeMap<i64, Vec<MenuItem>> =
            sections.iter().map(|s| (s.id, Vec::new())).collect();
        for item in items {
            grouped.entry(item.section_id).or_default().push(item);
        }
        for list in grouped.values_mut() {
            list.sort_by_key(|i| (i.position, i.id));
        }

        Self {
            menus,
            sections,
            items: grouped,
        }
    }

    pub fn items_in(&self, section_id: i64) -> &[MenuItem] {
        self.items
            .get(&section_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// A batch adopted locally and waiting to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSave {
    pub kind: DragKind,
    /// Restaurant for menus, menu otherwise
    pub parent_id: i64,
    pub updates: Vec<PositionUpdate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Released outside a list, or onto its own slot
    Unchanged,
    Pending(PendingSave),
}

fn single_list<T>(
    plan: ReorderPlan<T>,
    kind: DragKind,
) -> ClientResult<Option<(Vec<T>, Vec<PositionUpdate>)>> {
    match plan {
        ReorderPlan::Unchanged => Ok(None),
        ReorderPlan::Reordered { items, updates, .. } => Ok(Some((items, updates))),
        ReorderPlan::Moved { .. } => Err(ReorderError::CrossScopeMove { kind }.into()),
    }
}

#[derive(Debug)]
pub struct MenuBoard {
    restaurant_id: i64,
    menu_id: i64,
    state: Optimistic<BoardState>,
    session: DragSession,
    save_timeout: Duration,
}

impl MenuBoard {
    pub fn new(restaurant_id: i64, menu_id: i64, state: BoardState) -> Self {
        Self {
            restaurant_id,
            menu_id,
            state: Optimistic::new(state),
            session: DragSession::default(),
            save_timeout: ClientConfig::default().save_timeout,
        }
    }

    pub fn with_haptics(mut self, haptics: Arc<dyn Haptics>) -> Self {
        self.session = DragSession::new(haptics);
        self
    }

    pub fn with_save_timeout(mut self, timeout: Duration) -> Self {
        self.save_timeout = timeout;
        self
    }

    /// Fetch menus, sections and items from the server
    pub async fn load(
        client: &HttpClient,
        config: &ClientConfig,
        restaurant_id: i64,
        menu_id: i64,
    ) -> ClientResult<Self> {
        let state = Self::fetch(client, restaurant_id, menu_id).await?;
        Ok(Self::new(restaurant_id, menu_id, state).with_save_timeout(config.save_timeout))
    }

    async fn fetch(client: &HttpClient, restaurant_id: i64, menu_id: i64) -> ClientResult<BoardState> {
        let menus = client.list_menus(restaurant_id).await?;
        let sections = client.list_sections(menu_id).await?;
        let mut items = Vec::new();
        for section in &sections {
            items.extend(client.list_items(section.id).await?);
        }
        Ok(BoardState::new(menus, sections, items))
    }

    /// Replace the board with the server's current state
    pub async fn reload(&mut self, client: &HttpClient) -> ClientResult<()> {
        if self.state.is_pending() {
            return Err(ClientError::Busy);
        }
        let state = Self::fetch(client, self.restaurant_id, self.menu_id).await?;
        self.state.reset(state)
    }

    pub fn restaurant_id(&self) -> i64 {
        self.restaurant_id
    }

    pub fn menu_id(&self) -> i64 {
        self.menu_id
    }

    /// Current (possibly optimistic) state
    pub fn state(&self) -> &BoardState {
        self.state.current()
    }

    pub fn is_saving(&self) -> bool {
        self.state.is_pending()
    }

    pub fn drag_state(&self) -> DragState {
        self.session.state()
    }

    pub fn begin_drag(&mut self, kind: DragKind, source: DropLocation) -> ClientResult<()> {
        if self.state.is_pending() {
            return Err(ClientError::Busy);
        }
        self.session.begin(kind, source)
    }

    pub fn cancel_drag(&mut self) {
        self.session.cancel();
    }

    /// Finish the drag and adopt the new order locally
    pub fn drop(&mut self, destination: Option<DropLocation>) -> ClientResult<DropOutcome> {
        let request = self.session.finish(destination)?;
        let planned = self.plan(&request).inspect_err(|e| {
            tracing::warn!(kind = %request.kind, error = %e, "Drop rejected");
        })?;

        match planned {
            None => Ok(DropOutcome::Unchanged),
            Some((next, save)) => {
                self.state.apply(next)?;
                Ok(DropOutcome::Pending(save))
            }
        }
    }

    fn plan(&self, request: &MoveRequest) -> ClientResult<Option<(BoardState, PendingSave)>> {
        let current = self.state.current();
        let kind = request.kind;

        match kind {
            DragKind::Menus => {
                let scope = self.restaurant_id;
                let plan = plan_move(request, |id| {
                    (id == scope).then_some(current.menus.as_slice())
                })?;
                Ok(single_list(plan, kind)?.map(|(menus, updates)| {
                    let mut next = current.clone();
                    next.menus = menus;
                    (next, PendingSave { kind, parent_id: scope, updates })
                }))
            }
            DragKind::Sections => {
                let scope = self.menu_id;
                let plan = plan_move(request, |id| {
                    (id == scope).then_some(current.sections.as_slice())
                })?;
                Ok(single_list(plan, kind)?.map(|(sections, updates)| {
                    let mut next = current.clone();
                    next.sections = sections;
                    (next, PendingSave { kind, parent_id: scope, updates })
                }))
            }
            DragKind::Items => {
                let plan = plan_move(request, |id| current.items.get(&id).map(Vec::as_slice))?;
                let mut next = current.clone();
                let updates = match plan {
                    ReorderPlan::Unchanged => return Ok(None),
                    ReorderPlan::Reordered {
                        scope_id,
                        items,
                        updates,
                    } => {
                        next.items.insert(scope_id, items);
                        updates
                    }
                    ReorderPlan::Moved {
                        source_scope,
                        source,
                        destination_scope,
                        destination,
                        updates,
                    } => {
                        next.items.insert(source_scope, source);
                        next.items.insert(destination_scope, destination);
                        updates
                    }
                };
                Ok(Some((
                    next,
                    PendingSave {
                        kind,
                        parent_id: self.menu_id,
                        updates,
                    },
                )))
            }
        }
    }

    /// Save a pending batch; on any failure the pre-drag state comes back
    pub async fn persist<S>(&mut self, sink: &S, save: PendingSave) -> ClientResult<()>
    where
        S: PositionSink + ?Sized,
    {
        if !self.state.is_pending() {
            return Err(ClientError::InvalidState("no pending save".to_string()));
        }

        let saving = sink.save_positions(save.kind, save.parent_id, &save.updates);
        let result = match tokio::time::timeout(self.save_timeout, saving).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(self.save_timeout)),
        };

        match result {
            Ok(()) => {
                self.state.commit();
                tracing::debug!(kind = %save.kind, updates = save.updates.len(), "Drop saved");
                Ok(())
            }
            Err(e) => {
                self.state.rollback();
                tracing::warn!(kind = %save.kind, error = %e, "Save failed, order restored");
                Err(e)
            }
        }
    }

    /// [`drop`](Self::drop) followed by [`persist`](Self::persist)
    pub async fn drop_and_save<S>(
        &mut self,
        sink: &S,
        destination: Option<DropLocation>,
    ) -> ClientResult<DropOutcome>
    where
        S: PositionSink + ?Sized,
    {
        let outcome = self.drop(destination)?;
        if let DropOutcome::Pending(save) = &outcome {
            self.persist(sink, save.clone()).await?;
        }
        Ok(outcome)
    }
}
