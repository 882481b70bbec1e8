//! Per-user advisory locks.
//!
//! A guard is held across the whole "record user turn, await the model,
//! record the reply, persist" span so two events from the same user can
//! never interleave, while events from different users run concurrently.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct UserLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`. Waiters are served in FIFO
    /// order, which keeps same-user events in arrival order.
    pub async fn acquire(&self, user_id: &str) -> OwnedMutexGuard<()> {
        // Clone the Arc out so no DashMap guard is held across the await.
        let lock = self
            .locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop lock entries nobody holds or waits on. Returns how many went.
    pub fn prune_idle(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - self.locks.len()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
