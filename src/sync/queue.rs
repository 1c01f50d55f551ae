use crate::domain::BoardId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-board async locks that queue operations targeting the same board
///
/// Holding a board's guard across the mutate-then-reload sequence means a
/// second operation on that board starts only after the first has committed.
/// Operations on different boards still interleave freely.
#[derive(Debug, Default)]
pub struct BoardLocks {
    locks: Mutex<HashMap<BoardId, Arc<Mutex<()>>>>,
}

impl BoardLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the board's turn and returns the guard for it
    pub async fn acquire(&self, board_id: &BoardId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(board_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Drops the lock entry of a board that no longer exists
    pub async fn forget(&self, board_id: &BoardId) {
        self.locks.lock().await.remove(board_id);
    }
}
