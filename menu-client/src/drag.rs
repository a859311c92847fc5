//! Drag session state machine
//!
//! ```text
//! Idle ──begin()──► Dragging ──finish()──► Idle
//!                     │                    (MoveRequest handed to the caller)
//!                     └──cancel()─────────► Idle
//! ```

use std::sync::Arc;

use shared::reorder::{DragKind, DropLocation, MoveRequest};

use crate::{ClientError, ClientResult};

/// Best-effort tactile feedback
///
/// Returns `false` when the device has no such capability. That is never an
/// error.
pub trait Haptics: Send + Sync {
    fn vibrate(&self) -> bool;
}

/// Devices without haptics
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        kind: DragKind,
        source: DropLocation,
    },
}

/// One drag surface's session
pub struct DragSession {
    state: DragState,
    haptics: Arc<dyn Haptics>,
}

impl std::fmt::Debug for DragSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragSession")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new(Arc::new(NoHaptics))
    }
}

impl DragSession {
    pub fn new(haptics: Arc<dyn Haptics>) -> Self {
        Self {
            state: DragState::Idle,
            haptics,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Idle -> Dragging, firing haptics once
    pub fn begin(&mut self, kind: DragKind, source: DropLocation) -> ClientResult<()> {
        if self.is_dragging() {
            return Err(ClientError::InvalidState(
                "a drag is already in progress".to_string(),
            ));
        }

        if !self.haptics.vibrate() {
            tracing::trace!("Haptics unavailable");
        }
        self.state = DragState::Dragging { kind, source };
        Ok(())
    }

    /// Dragging -> Idle, returning the drop as a request
    ///
    /// `destination == None` means the item was released outside any list.
    pub fn finish(&mut self, destination: Option<DropLocation>) -> ClientResult<MoveRequest> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => Err(ClientError::InvalidState(
                "drop without an active drag".to_string(),
            )),
            DragState::Dragging { kind, source } => {
                Ok(MoveRequest::new(kind, source, destination))
            }
        }
    }

    /// Abandon the drag without a drop
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingHaptics {
        calls: AtomicUsize,
    }

    impl Haptics for CountingHaptics {
        fn vibrate(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    #[test]
    fn test_full_cycle() {
        let mut session = DragSession::default();
        assert_eq!(session.state(), DragState::Idle);

        session.begin(DragKind::Items, DropLocation::new(1, 0)).unwrap();
        assert!(session.is_dragging());

        let request = session.finish(Some(DropLocation::new(2, 1))).unwrap();
        assert_eq!(request.kind, DragKind::Items);
        assert_eq!(request.destination, Some(DropLocation::new(2, 1)));
        assert_eq!(session.state(), DragState::Idle);
    }

    #[test]
    fn test_haptics_once_per_start() {
        let haptics = Arc::new(CountingHaptics::default());
        let mut session = DragSession::new(haptics.clone());

        session.begin(DragKind::Sections, DropLocation::new(1, 0)).unwrap();
        assert!(session.begin(DragKind::Sections, DropLocation::new(1, 1)).is_err());
        assert_eq!(haptics.calls.load(Ordering::SeqCst), 1);

        session.finish(None).unwrap();
        session.begin(DragKind::Sections, DropLocation::new(1, 1)).unwrap();
        assert_eq!(haptics.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_drop_while_idle_is_rejected() {
        let mut session = DragSession::default();
        assert!(matches!(
            session.finish(Some(DropLocation::new(1, 0))),
            Err(ClientError::InvalidState(_))
        ));

        session.begin(DragKind::Menus, DropLocation::new(1, 0)).unwrap();
        session.cancel();
        assert!(session.finish(None).is_err());
    }
}
