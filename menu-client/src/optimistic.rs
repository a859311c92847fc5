//! Optimistic state with snapshot / rollback
//!
//! `apply` swaps in the predicted state and keeps the last known-good one.
//! Exactly one prediction may be outstanding; `commit` forgets the snapshot,
//! `rollback` restores it.

use std::future::Future;

use crate::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct Optimistic<T> {
    current: T,
    snapshot: Option<T>,
}

impl<T: Clone> Optimistic<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: value,
            snapshot: None,
        }
    }

    /// State to render (predicted while a save is pending)
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Last known-good state
    pub fn confirmed(&self) -> &T {
        self.snapshot.as_ref().unwrap_or(&self.current)
    }

    pub fn is_pending(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Adopt `next` before persistence completes
    pub fn apply(&mut self, next: T) -> ClientResult<()> {
        if self.is_pending() {
            return Err(ClientError::Busy);
        }
        self.snapshot = Some(std::mem::replace(&mut self.current, next));
        Ok(())
    }

    /// Persistence succeeded
    pub fn commit(&mut self) {
        self.snapshot = None;
    }

    /// Persistence failed: restore the snapshot
    pub fn rollback(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.current = snapshot;
        }
    }

    /// Replace the confirmed state, e.g. after a reload
    pub fn reset(&mut self, value: T) -> ClientResult<()> {
        if self.is_pending() {
            return Err(ClientError::Busy);
        }
        self.current = value;
        Ok(())
    }

    /// apply, await `save`, then commit or roll back
    pub async fn transact<F>(&mut self, next: T, save: F) -> ClientResult<()>
    where
        F: Future<Output = ClientResult<()>>,
    {
        self.apply(next)?;
        match save.await {
            Ok(()) => {
                self.commit();
                Ok(())
            }
            Err(e) => {
                self.rollback();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_commit() {
        let mut state = Optimistic::new(vec![1, 2, 3]);
        state.apply(vec![2, 3, 1]).unwrap();
        assert!(state.is_pending());
        assert_eq!(state.current(), &vec![2, 3, 1]);
        assert_eq!(state.confirmed(), &vec![1, 2, 3]);

        state.commit();
        assert!(!state.is_pending());
        assert_eq!(state.confirmed(), &vec![2, 3, 1]);
    }

    #[test]
    fn test_apply_rollback() {
        let mut state = Optimistic::new(vec![1, 2, 3]);
        state.apply(vec![3, 2, 1]).unwrap();
        state.rollback();
        assert_eq!(state.current(), &vec![1, 2, 3]);
        assert!(!state.is_pending());
    }

    #[test]
    fn test_one_outstanding_prediction() {
        let mut state = Optimistic::new(0);
        state.apply(1).unwrap();
        assert!(matches!(state.apply(2), Err(ClientError::Busy)));
        assert!(matches!(state.reset(5), Err(ClientError::Busy)));
        assert_eq!(state.current(), &1);
    }

    #[tokio::test]
    async fn test_transact() {
        let mut state = Optimistic::new("a");
        state.transact("b", async { Ok(()) }).await.unwrap();
        assert_eq!(state.current(), &"b");

        let err = state
            .transact("c", async { Err(ClientError::Internal("boom".into())) })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Internal(_)));
        assert_eq!(state.current(), &"b");
        assert!(!state.is_pending());
    }
}
